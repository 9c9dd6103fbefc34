// Application configuration, loaded from environment variables and CLI flags.

/// Which strategy generator the orchestrator uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyMode {
    /// Deterministic fixed-rule generator. Never fails.
    Heuristic,
    /// Chat-completion language model, with the bracket-extraction parse.
    Generative,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Base URL of the Statbotics v3 API.
    pub statbotics_url: String,
    /// Base URL of the chat-completion service.
    pub openai_api_url: String,
    /// API key for the chat-completion service. The generative strategy
    /// path is unavailable without one.
    pub openai_api_key: Option<String>,
    /// Resolved strategy mode (generative requires a key).
    pub strategy_mode: StrategyMode,
    /// Origins allowed to call the API cross-origin.
    pub allowed_origins: Vec<String>,
}

const DEFAULT_STATBOTICS_URL: &str = "https://api.statbotics.io/v3";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_ORIGINS: &str = "http://localhost:5174,http://localhost:5175";

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `PORT` - HTTP server port (default: 3001)
    /// - `STATBOTICS_API_URL` - Statbotics base URL
    /// - `OPENAI_API_KEY` - chat-completion API key
    /// - `OPENAI_API_URL` - chat-completion base URL
    /// - `STRATEGY_MODE` - `generative` or `heuristic`
    /// - `ALLOWED_ORIGINS` - comma-separated CORS origins
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--heuristic` - Force the heuristic generator
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(&args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| std::env::var("PORT").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(3001);

        let statbotics_url = std::env::var("STATBOTICS_API_URL")
            .unwrap_or_else(|_| DEFAULT_STATBOTICS_URL.to_string());

        let openai_api_url =
            std::env::var("OPENAI_API_URL").unwrap_or_else(|_| DEFAULT_OPENAI_URL.to_string());

        let openai_api_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());

        let requested_mode = if args.contains(&"--heuristic".to_string()) {
            StrategyMode::Heuristic
        } else {
            match std::env::var("STRATEGY_MODE").as_deref() {
                Ok("heuristic") => StrategyMode::Heuristic,
                _ => StrategyMode::Generative,
            }
        };

        // Generative mode needs a key; fall back rather than fail at startup.
        let strategy_mode = match requested_mode {
            StrategyMode::Generative if openai_api_key.is_none() => {
                tracing::warn!(
                    "OPENAI_API_KEY not set, falling back to the heuristic strategy generator"
                );
                StrategyMode::Heuristic
            }
            mode => mode,
        };

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| DEFAULT_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Config {
            port,
            statbotics_url,
            openai_api_url,
            openai_api_key,
            strategy_mode,
            allowed_origins,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
