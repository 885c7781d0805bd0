/// Instructions shared by every classification prompt.
const SORTING_RULES: &str = "Only look at things that are thrown in the trash daily or very usually, not occasionally. \
Ignore any person and electronics (laptop, refrigerator, tv, cell phone, hair dryer, remote), \
ignore fire hydrants, wine glasses and donuts. \
Tell me where each remaining item should go: compost, recyclables or inorganic waste. \
If it's a bottle, assume it's a plastic bottle. \
Give me the answer in this format \"Bottle: Recyclables\", one item per line. Don't give any extra information.";

pub const RECOGNITION_PROMPT: &str = "List the objects in this image. \
Give one object name per line, lowercase, with no numbering and no extra information.";

/// Build the sorting prompt from whatever evidence the client sent.
pub fn classification_prompt(labels: &[String], secondary: Option<&[String]>, has_image: bool) -> String {
    let mut prompt = String::new();
    if has_image {
        prompt.push_str("Look at the attached photo.\n");
    }
    if !labels.is_empty() {
        prompt.push_str(&format!("An object detector saw: {}.\n", labels.join(", ")));
    }
    if let Some(secondary) = secondary.filter(|s| !s.is_empty()) {
        prompt.push_str(&format!(
            "A second, independent detector saw: {}.\n",
            secondary.join(", ")
        ));
    }
    prompt.push_str(SORTING_RULES);
    prompt
}

/// Turn a free-text object listing into clean, unique names.
pub fn parse_object_list(text: &str) -> Vec<String> {
    let mut objects: Vec<String> = Vec::new();
    for line in text.lines() {
        let name = line
            .trim()
            .trim_start_matches(|c: char| c.is_ascii_digit() || matches!(c, '-' | '*' | '•' | '.' | ')'))
            .split([':', ','])
            .next()
            .unwrap_or("")
            .trim()
            .trim_matches('*')
            .to_lowercase();
        if !name.is_empty() && !objects.contains(&name) {
            objects.push(name);
        }
    }
    objects
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_all_evidence() {
        let prompt = classification_prompt(
            &["bottle".into(), "banana peel".into()],
            Some(&["cup".into()]),
            true,
        );
        assert!(prompt.starts_with("Look at the attached photo."));
        assert!(prompt.contains("An object detector saw: bottle, banana peel."));
        assert!(prompt.contains("A second, independent detector saw: cup."));
        assert!(prompt.contains("\"Bottle: Recyclables\""));
    }

    #[test]
    fn test_prompt_without_labels_relies_on_image() {
        let prompt = classification_prompt(&[], Some(&[]), true);
        assert!(!prompt.contains("detector saw"));
    }

    #[test]
    fn test_parse_object_list_strips_markers_and_coordinates() {
        let parsed = parse_object_list("1. Bottle: 10, 20, 30, 40\n- banana peel\n\n* **Cup**\nbottle\n");
        assert_eq!(parsed, vec!["bottle", "banana peel", "cup"]);
    }
}
