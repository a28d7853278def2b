use serde_json::{Map, Value, json};
use textargs::{Matches, Slot};

/// Printed in place of an omitted argument or option.
pub const OMITTED_MARKER: &str = "<omitted>";

fn slot_json(slot: &Slot) -> Value {
    match slot {
        Slot::Filled(value) => value.clone(),
        Slot::Omitted => Value::String(OMITTED_MARKER.to_string()),
    }
}

fn slot_map<'a>(entries: impl Iterator<Item = (&'a String, &'a Slot)>) -> Value {
    Value::Object(
        entries
            .map(|(name, slot)| (name.clone(), slot_json(slot)))
            .collect::<Map<_, _>>(),
    )
}

pub fn matches_json(matches: &Matches<'_>) -> Value {
    let arguments = matches.arguments();
    json!({
        "arguments": {
            "ordered": arguments.ordered().iter().map(slot_json).collect::<Vec<_>>(),
            "leftover": arguments.leftover(),
            "named": slot_map(arguments.named_map().iter()),
        },
        "options": slot_map(matches.options().iter()),
        "flags": matches.flags(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use textargs::{Parser, simple};

    #[tokio::test]
    async fn omitted_slots_render_as_marker() {
        let parser: Parser = Parser::builder()
            .argument(simple::number().named("count"))
            .argument(simple::string().optional().named("label"))
            .flag(simple::flag("silent"))
            .option(simple::string_option("channel").alt("c"))
            .build()
            .unwrap();

        let m = parser.parse("3 --silent").await.unwrap();
        let json = matches_json(&m);

        assert_eq!(json["arguments"]["ordered"], json!([3.0, OMITTED_MARKER]));
        assert_eq!(json["arguments"]["named"]["count"], json!(3.0));
        assert_eq!(json["arguments"]["named"]["label"], json!(OMITTED_MARKER));
        assert_eq!(json["options"]["channel"], json!(OMITTED_MARKER));
        assert_eq!(json["options"]["c"], json!(OMITTED_MARKER));
        assert_eq!(json["flags"]["silent"], json!(true));
    }
}
