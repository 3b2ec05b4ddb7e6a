/// The assembled program: one 32 bit word per ROM address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rom {
    words: Vec<u32>,
}

impl Rom {
    pub fn new(words: Vec<u32>) -> Self {
        Self { words }
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Each word as exactly 32 `0`/`1` characters, in address order.
    pub fn to_lines(&self) -> Vec<String> {
        self.words.iter().map(|word| format!("{word:032b}")).collect()
    }

    /// The ROM file read by the simulator.
    pub fn to_text(&self) -> String {
        self.to_lines().into_iter().map(|line| line + "\n").collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut json = serde_json::Map::new();
        json.insert(
            "rom".to_string(),
            serde_json::Value::Array(
                self.words
                    .iter()
                    .map(|word| serde_json::Value::Number((*word).into()))
                    .collect(),
            ),
        );
        serde_json::Value::Object(json)
    }

    pub fn pprint(&self) {
        let width = self.words.len().saturating_sub(1).to_string().len();
        for (addr, word) in self.words.iter().enumerate() {
            println!("{addr:>width$}: {word:032b} ({word:08X})");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_has_one_line_per_word() {
        let rom = Rom::new(vec![7, 0x8000_0001]);
        assert_eq!(
            rom.to_text(),
            "00000000000000000000000000000111\n10000000000000000000000000000001\n"
        );
        assert_eq!(rom.to_lines().iter().map(String::len).collect::<Vec<_>>(), vec![32, 32]);
    }

    #[test]
    fn json_lists_words() {
        let rom = Rom::new(vec![1, 57]);
        assert_eq!(rom.to_json(), serde_json::json!({ "rom": [1, 57] }));
        assert_eq!(Rom::default().to_json(), serde_json::json!({ "rom": [] }));
    }
}
