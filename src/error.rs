use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
    #[display("missing environment variable {name}")]
    MissingEnv { name: String },
}

#[derive(Debug, Display, Error)]
pub enum ProviderError {
    #[display("failed to build http client for {provider}")]
    Client { provider: String },
    #[display("request to {provider} failed")]
    Request { provider: String },
    #[display("failed to parse response from {provider}")]
    ResponseParse { provider: String },
}

#[derive(Debug, Display, Error)]
pub enum IndicatorError {
    #[display("invalid parameter: {name}")]
    InvalidParameter { name: String },
}

#[derive(Debug, Display, Error)]
pub enum ChartError {
    #[display("nothing to plot")]
    EmptySeries,
    #[display("failed to create chart directory")]
    CreateDir,
    #[display("failed to draw chart")]
    Draw,
}

#[derive(Debug, Display, Error)]
pub enum NotifyError {
    #[display("invalid mail address")]
    Address,
    #[display("failed to read chart attachment")]
    Attachment,
    #[display("failed to build message")]
    Build,
    #[display("smtp delivery failed")]
    Transport,
}

#[derive(Debug, Display, Error)]
pub enum RunError {
    #[display("indicator computation failed")]
    Indicator,
    #[display("chart rendering failed")]
    Chart,
}
