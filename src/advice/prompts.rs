//! Prompt templates sent to the text-generation service.

/// Asks for treatment advice for `disease` as a three-key JSON object.
pub fn cure_prompt(disease: &str) -> String {
    format!(
        "The plant disease is '{disease}'.\n\
         Provide a JSON response with exactly these keys:\n\
         1. 'symptoms': brief list of symptoms\n\
         2. 'cure': step-by-step simple treatment\n\
         3. 'prevention': how to prevent it next time\n\
         \n\
         Keep the advice simple and actionable for a farmer.\n\
         Ensure the output is valid JSON.\n"
    )
}

/// Frames `message` as a question to an agricultural assistant.
pub fn chat_prompt(message: &str) -> String {
    format!(
        "System: You are a helpful expert agricultural assistant. \
         Provide clear, accurate advice about crops, diseases, and farming.\n\
         User: {message}\n"
    )
}
