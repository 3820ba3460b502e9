//! Prompt construction for assistive classification

/// Reply shape the classifier is asked to produce
pub const REPLY_SHAPE: &str = r#"{"category":"...","reason":"...","confidence":"low|med|high"}"#;

/// Build the classification prompt for one transaction
pub fn build_prompt(
    merchant_raw: &str,
    details: &str,
    amount_cents: i64,
    known_categories: &[String],
) -> String {
    format!(
        "You are helping classify personal finance transactions.\n\
         \n\
         Merchant: {}\n\
         Details: {}\n\
         Amount (cents, negative means spend): {}\n\
         \n\
         Known categories (pick one if appropriate):\n\
         {}\n\
         \n\
         Return JSON only:\n\
         {}\n",
        merchant_raw.trim(),
        details.trim(),
        amount_cents,
        known_categories.join(", "),
        REPLY_SHAPE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_inputs() {
        let prompt = build_prompt(
            "  CORNER CAFE 123 ",
            "POS PURCHASE",
            -4530,
            &["Dining".to_string(), "Groceries".to_string()],
        );

        assert!(prompt.contains("Merchant: CORNER CAFE 123\n"));
        assert!(prompt.contains("Details: POS PURCHASE\n"));
        assert!(prompt.contains("Amount (cents, negative means spend): -4530\n"));
        assert!(prompt.contains("Dining, Groceries"));
        assert!(prompt.trim_end().ends_with(REPLY_SHAPE));
    }
}
