use crate::reading::Reading;

pub const HELP_TEXT: &str =
    "Comandos disponibles:\n- status: muestra la temperatura y humedad actuales";
pub const NO_DATA_TEXT: &str = "No hay datos disponibles en ThingSpeak";

/// Reply text for an inbound chat command.
///
/// `status` (or `estado`) renders the latest reading; anything else gets the
/// help text. Matching ignores case and surrounding whitespace.
pub fn build_reply(command: &str, latest: Option<&Reading>) -> String {
    if !is_status_command(command) {
        return HELP_TEXT.to_string();
    }
    match latest {
        Some(reading) => render_status(reading),
        None => NO_DATA_TEXT.to_string(),
    }
}

/// Whether `command` asks for the current reading.
pub fn is_status_command(command: &str) -> bool {
    matches!(command.trim().to_lowercase().as_str(), "status" | "estado")
}

fn render_status(reading: &Reading) -> String {
    let temperature = reading
        .temperature
        .map_or_else(|| "sin dato".to_string(), |t| format!("{t}°C"));
    let humidity = reading
        .humidity
        .map_or_else(|| "sin dato".to_string(), |h| format!("{h}%"));
    let mut text = format!("Temperatura: {temperature}\nHumedad: {humidity}");
    if let Some(ts) = &reading.created_at {
        text.push_str(&format!("\nÚltima lectura: {ts}"));
    }
    text
}

/// Wrap a reply in the XML document the messaging webhook expects.
pub fn twiml_message(text: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(text)
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_is_case_insensitive() {
        let reading = Reading::new(Some(55), Some(23), Some("2024-05-01T10:00:00Z".into()));
        let reply = build_reply("  STATUS ", Some(&reading));
        assert_eq!(
            reply,
            "Temperatura: 23°C\nHumedad: 55%\nÚltima lectura: 2024-05-01T10:00:00Z"
        );
        assert_eq!(build_reply("Estado", Some(&reading)), reply);
    }

    #[test]
    fn status_without_data() {
        assert_eq!(build_reply("status", None), NO_DATA_TEXT);
    }

    #[test]
    fn status_with_partial_reading() {
        let reading = Reading::new(None, Some(23), None);
        assert_eq!(
            build_reply("status", Some(&reading)),
            "Temperatura: 23°C\nHumedad: sin dato"
        );
    }

    #[test]
    fn unknown_command_gets_help() {
        assert_eq!(build_reply("hola", None), HELP_TEXT);
        assert_eq!(build_reply("", None), HELP_TEXT);
    }

    #[test]
    fn twiml_escapes_markup() {
        let xml = twiml_message("T<30 & H>20");
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>T&lt;30 &amp; H&gt;20</Message></Response>"
        );
    }
}
