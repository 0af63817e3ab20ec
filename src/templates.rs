use std::collections::HashMap;

use tera::Tera;

use crate::error::AppError;

/// Name the status page is registered under
pub const STATUS_TEMPLATE: &str = "status.html";

const STATUS_TEMPLATE_SOURCE: &str = include_str!("../templates/status.html");

/// Bytes per mebibyte
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Initialize the Tera template engine with the templates compiled into the binary
pub fn init_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_template(STATUS_TEMPLATE, STATUS_TEMPLATE_SOURCE)?;

    tera.register_filter("megabytes", megabytes_filter);

    Ok(tera)
}

/// Convert a byte count to whole mebibytes, rounded to nearest
fn megabytes_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let bytes = value
        .as_u64()
        .ok_or_else(|| tera::Error::msg("megabytes filter expects an unsigned integer"))?;

    Ok(tera::Value::from((bytes + BYTES_PER_MB / 2) / BYTES_PER_MB))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_megabytes_filter_rounds() {
        let args = HashMap::new();
        let result =
            megabytes_filter(&tera::Value::from(3 * BYTES_PER_MB / 2), &args).unwrap();
        assert_eq!(result, tera::Value::from(2u64));

        let result = megabytes_filter(&tera::Value::from(BYTES_PER_MB / 4), &args).unwrap();
        assert_eq!(result, tera::Value::from(0u64));
    }

    #[test]
    fn test_megabytes_filter_rejects_strings() {
        let args = HashMap::new();
        assert!(megabytes_filter(&tera::Value::from("lots"), &args).is_err());
    }

    #[test]
    fn test_status_template_renders() {
        let tera = init_templates().unwrap();
        let mut context = tera::Context::new();
        context.insert("healthy", &false);
        context.insert("hostname", "web-1");
        context.insert("platform", "linux");
        context.insert("arch", "x86_64");
        context.insert("version", "0.1.0");
        context.insert("uptime", &42u64);
        context.insert("checks", &7u64);
        context.insert(
            "memory",
            &crate::system::MemorySnapshot::new(2 * BYTES_PER_MB, BYTES_PER_MB),
        );

        let html = tera.render(STATUS_TEMPLATE, &context).unwrap();
        assert!(html.contains("UNHEALTHY"));
        assert!(html.contains("<code>web-1</code>"));
        assert!(html.contains("<code>42s</code>"));
        assert!(html.contains("1MB free / 2MB total"));
    }
}
