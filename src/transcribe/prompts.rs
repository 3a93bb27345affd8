/// Instructions sent alongside audio or subtitle payloads.
pub struct Prompts;

impl Prompts {
    /// Timed transcription; the reply is constrained by the entry schema.
    pub fn transcribe_subtitles() -> &'static str {
        "Transcribe the provided audio file. Generate accurate, continuous timestamps \
         for every sentence or phrase. Make sure the output is a valid JSON array that \
         matches the provided schema."
    }

    /// Untimed transcription as one paragraph.
    pub fn transcribe_plain_text() -> &'static str {
        "Transcribe the provided audio file. Merge all of the speech into one coherent \
         paragraph. Do not include timestamps, speaker labels or any special formatting; \
         return only the transcribed text."
    }

    /// Translate the `text` field of serialized entries, nothing else.
    pub fn translate_subtitles(target_language: &str, entries_json: &str) -> String {
        format!(
            r#"Translate the 'text' field of every object in the following JSON array into {target_language}. Keep exactly the same JSON structure, including every 'startTime' and 'endTime' value and the number of objects. Only change the 'text' field to the translated content.

{entries_json}"#
        )
    }

    pub fn translate_text(target_language: &str, text: &str) -> String {
        format!(
            r#"Translate the following text into {target_language}. Return only the translated text, without any added formatting, notes or commentary.

{text}"#
        )
    }
}
