//! Analysis prompt construction.

/// Build the fraud-analysis prompt for a suspicious message
///
/// The model is instructed to answer with a bare JSON object so the
/// verdict parser can consume it directly. Models still occasionally
/// wrap the object in a Markdown fence; the parser strips that.
pub fn build_analysis_prompt(message: &str) -> String {
    format!(
        "You are a digital security and fraud detection expert. \
         Analyze the following message with extreme care:\n\
         ---\n\
         {message}\n\
         ---\n\
         Return a detailed analysis as a JSON object with these fields:\n\
         {{\n\
           \"risk_level\": \"string (one of: Low, Medium, High, Very High)\",\n\
           \"summary\": \"string (concise summary of the analysis)\",\n\
           \"alerts\": [\"string (suspicious points found)\"],\n\
           \"recommendation\": \"string (main recommendation)\"\n\
         }}\n\
         Respond with only the JSON object."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_message() {
        let prompt = build_analysis_prompt("click here to claim your prize");
        assert!(prompt.contains("click here to claim your prize"));
        assert!(prompt.contains("risk_level"));
        assert!(prompt.contains("only the JSON object"));
    }
}
