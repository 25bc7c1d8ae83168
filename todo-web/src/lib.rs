pub mod config {
    use serde::Deserialize;
    use std::time::Duration;

    #[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
    pub struct Config {
        #[serde(default = "default_host")]
        pub host: String,
        #[serde(default = "default_port")]
        pub port: u16,
        /// Name of the cookie carrying the session id.
        #[serde(default = "default_session_cookie")]
        pub session_cookie: String,
        /// Sessions idle for longer than this are discarded.
        #[serde(default = "default_session_idle_minutes")]
        pub session_idle_minutes: u64,
    }

    impl Config {
        /// Loads configuration from `TODO_*` environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_environment(config::Environment::with_prefix("TODO"))
        }

        /// Loads configuration from the given environment source.
        pub fn from_environment(environment: config::Environment) -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(environment.try_parsing(true))
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }

        pub fn session_idle_timeout(&self) -> Duration {
            Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
        }
    }

    impl Default for Config {
        fn default() -> Self {
            Self {
                host: default_host(),
                port: default_port(),
                session_cookie: default_session_cookie(),
                session_idle_minutes: default_session_idle_minutes(),
            }
        }
    }

    fn default_host() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    fn default_session_cookie() -> String {
        "todo_session".to_string()
    }

    fn default_session_idle_minutes() -> u64 {
        60
    }

}

pub mod session;
pub mod tasks;
pub mod web;
