use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClimaError {
    #[error("{0} no configurado")]
    ConfigMissing(String),

    #[error("No hay datos en ThingSpeak")]
    NoData,

    #[error("Error comunicando con ThingSpeak: {0}")]
    UpstreamUnavailable(String),

    #[error("ThingSpeak rechazó la escritura: {0}")]
    WriteRejected(String),

    #[error("mensajería no disponible: {0}")]
    MessagingUnavailable(String),

    #[error("Error enviando WhatsApp: {0}")]
    DeliveryFailed(String),

    #[error("umbrales inválidos: {0}")]
    InvalidThresholds(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ClimaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_spanish() {
        assert_eq!(
            ClimaError::ConfigMissing("THINGSPEAK_CHANNEL_ID".into()).to_string(),
            "THINGSPEAK_CHANNEL_ID no configurado"
        );
        assert_eq!(
            ClimaError::InvalidThresholds("hum: optimal (95) fuera de [20, 80]".into()).to_string(),
            "umbrales inválidos: hum: optimal (95) fuera de [20, 80]"
        );
        assert_eq!(
            ClimaError::DeliveryFailed("HTTP 400".into()).to_string(),
            "Error enviando WhatsApp: HTTP 400"
        );
    }
}
