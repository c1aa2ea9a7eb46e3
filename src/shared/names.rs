pub const MAX_ROOM_NAME_LENGTH: usize = 100;

pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn leading_symbol(name: &str) -> String {
    name.chars().next().map(String::from).unwrap_or_default()
}
