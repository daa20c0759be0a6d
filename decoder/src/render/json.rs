use crate::module::PycModule;

/// Serialize the decoded tree as pretty-printed JSON
pub fn to_string_pretty(module: &PycModule) -> serde_json::Result<String> {
    serde_json::to_string_pretty(module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use crate::fixtures::{Fixture, MAGIC_3_5_2};
    use crate::Decoder;

    #[test]
    fn test_json_projection() {
        let data = Fixture::new()
            .header(MAGIC_3_5_2, 5, Some(6))
            .minimal_code(&[100, 0, 0, 83])
            .build();
        let module = Decoder::default().decode("m.pyc", Cursor::new(data)).unwrap();
        let text = to_string_pretty(&module).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["source"], "m.pyc");
        assert_eq!(value["version"]["minor"], 5);
        assert_eq!(value["header"]["time_stamp"]["value"], 5);
        assert_eq!(value["header"]["time_stamp"]["offset"], 4);
        assert_eq!(value["body"]["tag"]["offset"], 12);
        assert_eq!(value["body"]["object"]["type"], "code");

        let instructions = &value["body"]["object"]["disassembly"]["instructions"];
        assert_eq!(instructions[0]["mnemonic"], "LOAD_CONST");
        assert_eq!(instructions[0]["operand"], 0);
        assert!(instructions[1]["operand"].is_null());
        assert!(value["body"]["object"]["disassembly"]["truncated_at"].is_null());
    }

    #[test]
    fn test_pretty_string_parses_back() {
        let data = Fixture::new().header(MAGIC_3_5_2, 0, Some(0)).none().build();
        let module = Decoder::default().decode("n.pyc", Cursor::new(data)).unwrap();
        let text = to_string_pretty(&module).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["body"]["object"]["type"], "none");
    }
}
