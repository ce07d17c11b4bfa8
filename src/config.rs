//! Flat run configuration, handed to the runner as a plain value. There is
//! no process-global config: whoever drives a query (the CLI, a test) builds
//! one of these and passes it down explicitly.

use serde::{Deserialize, Serialize};

/// Location and shape of the DDL used to create the working tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdlConfig {
    pub path: String,
    pub ddl: String,
}

/// Which query to run, identified by its source file and an id used in logs
/// and result file names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    pub path: String,
    pub query_id: String,
}

/// Where the scale-factor data set lives and in which format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub path: String,
    pub format: String,
}

/// Where to write results, and whether to prefix them with a headline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultConfig {
    pub path: String,
    pub need_headline: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tpch1gConfig {
    pub ddl: DdlConfig,
    pub query: QueryConfig,
    pub data: DataConfig,
    pub result: ResultConfig,
}

/// Debug/diagnostic knobs: row-count caps for quick iteration, and what to
/// print along the way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    pub show_raw: bool,
    pub enable_max_scan_rows: bool,
    pub max_scan_rows: usize,
    pub max_output_row_count: Option<usize>,
    pub print_result: bool,
    pub print_plan: bool,
    pub count: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_raw: false,
            enable_max_scan_rows: false,
            max_scan_rows: usize::MAX,
            max_output_row_count: None,
            print_result: true,
            print_plan: false,
            count: false,
        }
    }
}

/// The complete run configuration: `tpch1g.*` plus `debug.*`, loaded by
/// whatever embeds this core (a CLI, a test harness) and handed to the
/// `ExecutionContext`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tpch1g: Tpch1gConfig,
    pub debug: DebugConfig,
}

impl Config {
    pub fn for_query(ddl_path: &str, query_path: &str, query_id: &str, data_path: &str) -> Self {
        Self {
            tpch1g: Tpch1gConfig {
                ddl: DdlConfig {
                    path: ddl_path.to_string(),
                    ddl: String::new(),
                },
                query: QueryConfig {
                    path: query_path.to_string(),
                    query_id: query_id.to_string(),
                },
                data: DataConfig {
                    path: data_path.to_string(),
                    format: "csv".to_string(),
                },
                result: ResultConfig {
                    path: String::new(),
                    need_headline: true,
                },
            },
            debug: DebugConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_debug_config_has_no_row_cap() {
        let debug = DebugConfig::default();
        assert!(!debug.enable_max_scan_rows);
        assert_eq!(debug.max_output_row_count, None);
    }

    #[test]
    fn test_for_query_builder() {
        let config = Config::for_query("ddl.sql", "q1.sql", "q1", "/data/tpch1g");
        assert_eq!(config.tpch1g.query.query_id, "q1");
        assert_eq!(config.tpch1g.data.path, "/data/tpch1g");
    }
}
