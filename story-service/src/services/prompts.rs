//! Prompt construction for the text and image providers.

/// How much of a paragraph is quoted into its scene prompt, in characters.
pub const SCENE_EXCERPT_CHARS: usize = 300;

/// The sentence naming the cast, or asking for `characters` of them.
pub fn character_context(characters: u32, names: &[String]) -> String {
    if names.is_empty() {
        format!("The story should have {} main characters. ", characters)
    } else {
        format!("The main characters are: {}. ", names.join(", "))
    }
}

pub fn story_prompt(genre: &str, characters: u32, names: &[String], paragraphs: u32) -> String {
    format!(
        "Write a creative and engaging {genre} story with the following requirements:\n\
         {context}\n\
         The story should be exactly {paragraphs} paragraphs long.\n\
         Each paragraph should be rich in detail and advance the plot.\n\
         Make the story engaging, with vivid descriptions and emotional depth.\n\
         Ensure each paragraph flows naturally into the next.\n\
         The story should have a clear beginning, middle, and end.",
        genre = genre,
        context = character_context(characters, names),
        paragraphs = paragraphs,
    )
}

pub fn summary_prompt(genre: &str) -> String {
    format!(
        "Write a brief, engaging summary (2-3 sentences) for this {} story that introduces \
         the main characters and sets the tone without revealing major plot points.",
        genre
    )
}

/// Scene description handed back to the client for one paragraph.
pub fn scene_prompt(genre: &str, paragraph: &str) -> String {
    format!(
        "A cinematic scene from a {} story: {}. Beautiful lighting, detailed characters, \
         atmospheric setting, high quality illustration.",
        genre,
        excerpt(paragraph, SCENE_EXCERPT_CHARS)
    )
}

/// The prompt actually sent to the image provider for a scene.
pub fn illustration_prompt(scene: &str) -> String {
    format!(
        "Create a beautiful, detailed illustration for a story: {}. Style: cinematic, \
         high quality, detailed, artistic, storybook illustration.",
        scene
    )
}

pub fn edit_prompt(original: &str, instructions: &str) -> String {
    format!(
        "Original story paragraph: \"{}\"\n\
         Edit instructions: {}\n\
         Please rewrite this paragraph following the edit instructions while maintaining \
         the story's flow and style.",
        original, instructions
    )
}

/// First `max_chars` characters of `text`, never splitting a code point.
fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
