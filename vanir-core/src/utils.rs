// ABOUTME: Shared text helpers for chat replies
// ABOUTME: Mention stripping and splitting long replies into platform-sized chunks

/// Maximum message length on Discord (chars)
pub const DISCORD_MAX_CHARS: usize = 2000;

/// Remove the first mention of `bot_id` (`<@id>` or `<@!id>`) and trim
pub fn strip_mention(content: &str, bot_id: &str) -> String {
    for token in [format!("<@{}>", bot_id), format!("<@!{}>", bot_id)] {
        if let Some(pos) = content.find(&token) {
            let mut cleaned = String::with_capacity(content.len());
            cleaned.push_str(&content[..pos]);
            cleaned.push_str(&content[pos + token.len()..]);
            return cleaned.trim().to_string();
        }
    }
    content.trim().to_string()
}

/// Split long text into chunks, trying to break at line and then word boundaries
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let line_len = line.chars().count();

        // If adding this line would exceed limit, save current chunk
        if !current.is_empty() && current.chars().count() + line_len + 1 > max_chars {
            chunks.push(current.trim().to_string());
            current = String::new();
        }

        if line_len > max_chars {
            if !current.is_empty() {
                chunks.push(current.trim().to_string());
                current = String::new();
            }
            let mut line_part = String::new();
            for word in line.split_whitespace() {
                for piece in split_long_word(word, max_chars) {
                    if !line_part.is_empty()
                        && line_part.chars().count() + piece.chars().count() + 1 > max_chars
                    {
                        chunks.push(line_part.trim().to_string());
                        line_part = String::new();
                    }
                    if !line_part.is_empty() {
                        line_part.push(' ');
                    }
                    line_part.push_str(&piece);
                }
            }
            current = line_part;
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    chunks
}

fn split_long_word(word: &str, max_chars: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(max_chars.max(1))
        .map(|c| c.iter().collect())
        .collect()
}
