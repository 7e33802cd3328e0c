use serde_json::{json, Value};
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(target), Some(Value::Object(extra))) = (response.as_object_mut(), data) {
                target.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Output a single record: pretty JSON, or `key: value` lines for text
pub fn output_record(output_format: &OutputFormat, record: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(record)?),
        OutputFormat::Text => match record.as_object() {
            Some(fields) => {
                for (key, value) in fields {
                    println!("{:<18} {}", format!("{}:", key), text_value(value));
                }
            }
            None => println!("{}", text_value(record)),
        },
    }
    Ok(())
}

/// Render a JSON scalar without quotes for text output
pub fn text_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Field of a record as display text
pub fn field(record: &Value, name: &str) -> String {
    record.get(name).map(text_value).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_value_strips_quotes() {
        assert_eq!(text_value(&json!("acme")), "acme");
        assert_eq!(text_value(&json!(3)), "3");
        assert_eq!(text_value(&Value::Null), "-");
        assert_eq!(field(&json!({"plan": "pro"}), "plan"), "pro");
        assert_eq!(field(&json!({}), "plan"), "-");
    }
}
