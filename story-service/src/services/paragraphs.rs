/// Split generated text on blank lines into at most `limit` paragraphs.
///
/// Pieces are trimmed and empty pieces dropped, so runs of blank lines and
/// CRLF line endings do not produce phantom paragraphs.
pub fn split_paragraphs(text: &str, limit: usize) -> Vec<String> {
    text.replace("\r\n", "\n")
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .take(limit)
        .map(str::to_string)
        .collect()
}
