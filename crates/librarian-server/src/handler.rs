//! Tool request handler.

use crate::protocol::{
    resolve_limit, ErrorKind, Request, Response, ResponseData, CONFIG_URI, STATS_URI,
};
use crate::RequestHandler;
use async_trait::async_trait;
use librarian_core::IndexManager;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Routes tool requests to an [`IndexManager`]
pub struct ToolHandler {
    manager: Arc<IndexManager>,
}

impl ToolHandler {
    pub fn new(manager: Arc<IndexManager>) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &Arc<IndexManager> {
        &self.manager
    }

    fn limit(&self, limit: Option<i64>) -> usize {
        resolve_limit(limit, self.manager.config().default_limit)
    }

    async fn read_resource(&self, uri: &str) -> Response {
        match uri {
            STATS_URI => match self.manager.stats().await {
                Ok(stats) => Response::ok(stats.into()),
                Err(e) => e.into(),
            },
            CONFIG_URI => Response::ok(self.manager.config_info().into()),
            other => Response::error(
                ErrorKind::UnknownResource,
                format!("Unknown resource: {}", other),
            ),
        }
    }
}

#[async_trait]
impl RequestHandler for ToolHandler {
    async fn handle(&self, request: Request) -> Response {
        let start = Instant::now();

        let response = match request {
            Request::SearchFiles {
                query,
                case_sensitive,
                limit,
            } => self
                .manager
                .search_files(&query, case_sensitive, self.limit(limit))
                .await
                .map(ResponseData::from),

            Request::SearchFilesRegex {
                pattern,
                case_sensitive,
                limit,
            } => self
                .manager
                .search_files_regex(&pattern, case_sensitive, self.limit(limit))
                .await
                .map(ResponseData::from),

            Request::SearchByType {
                file_type,
                pattern,
                limit,
            } => self
                .manager
                .search_by_type(&file_type, pattern.as_deref(), self.limit(limit))
                .await
                .map(ResponseData::from),

            Request::RefreshIndex => self.manager.refresh().await.map(ResponseData::from),

            Request::GetIndexStats => self.manager.stats().await.map(ResponseData::from),

            Request::ReadResource { uri } => return self.read_resource(&uri).await,
        };

        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Request handled");

        match response {
            Ok(data) => Response::ok(data),
            Err(e) => {
                warn!(error = %e, "Request failed");
                e.into()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use librarian_core::LibrarianConfig;
    use std::fs;
    use tempfile::tempdir;

    fn handler_for(root: &std::path::Path) -> ToolHandler {
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/app.py"), "print('app')").unwrap();
        fs::write(root.join("src/util.py"), "def util(): pass").unwrap();
        fs::write(root.join("README.md"), "# Readme").unwrap();

        ToolHandler::new(Arc::new(IndexManager::new(root, LibrarianConfig::default())))
    }

    fn files(response: Response) -> Vec<String> {
        match response {
            Response::Ok {
                data: ResponseData::Files { files },
            } => files.into_iter().map(|f| f.path).collect(),
            other => panic!("Expected files, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_search_files() {
        let temp_dir = tempdir().unwrap();
        let handler = handler_for(temp_dir.path());

        let response = handler
            .handle(Request::SearchFiles {
                query: "app".to_string(),
                case_sensitive: false,
                limit: None,
            })
            .await;
        assert_eq!(files(response), vec!["src/app.py"]);
    }

    #[tokio::test]
    async fn test_negative_limit_is_unlimited() {
        let temp_dir = tempdir().unwrap();
        let handler = handler_for(temp_dir.path());

        let limited = handler
            .handle(Request::SearchFiles {
                query: String::new(),
                case_sensitive: false,
                limit: Some(1),
            })
            .await;
        assert_eq!(files(limited).len(), 1);

        let unlimited = handler
            .handle(Request::SearchFiles {
                query: String::new(),
                case_sensitive: false,
                limit: Some(-1),
            })
            .await;
        assert_eq!(files(unlimited).len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_regex() {
        let temp_dir = tempdir().unwrap();
        let handler = handler_for(temp_dir.path());

        let response = handler
            .handle(Request::SearchFilesRegex {
                pattern: "[unterminated".to_string(),
                case_sensitive: false,
                limit: None,
            })
            .await;
        assert!(matches!(
            response,
            Response::Error {
                kind: ErrorKind::InvalidPattern,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_search_by_type() {
        let temp_dir = tempdir().unwrap();
        let handler = handler_for(temp_dir.path());

        let response = handler
            .handle(Request::SearchByType {
                file_type: "python".to_string(),
                pattern: Some("util".to_string()),
                limit: None,
            })
            .await;
        assert_eq!(files(response), vec!["src/util.py"]);
    }

    #[tokio::test]
    async fn test_refresh_and_stats() {
        let temp_dir = tempdir().unwrap();
        let handler = handler_for(temp_dir.path());

        match handler.handle(Request::RefreshIndex).await {
            Response::Ok {
                data: ResponseData::Refresh { files_indexed, .. },
            } => assert_eq!(files_indexed, 3),
            other => panic!("Expected refresh, got {:?}", other),
        }

        match handler.handle(Request::GetIndexStats).await {
            Response::Ok {
                data: ResponseData::Stats { total_files, .. },
            } => assert_eq!(total_files, 3),
            other => panic!("Expected stats, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resources() {
        let temp_dir = tempdir().unwrap();
        let handler = handler_for(temp_dir.path());

        let response = handler
            .handle(Request::ReadResource {
                uri: CONFIG_URI.to_string(),
            })
            .await;
        assert!(matches!(
            response,
            Response::Ok {
                data: ResponseData::Config { .. }
            }
        ));

        let response = handler
            .handle(Request::ReadResource {
                uri: STATS_URI.to_string(),
            })
            .await;
        assert!(matches!(
            response,
            Response::Ok {
                data: ResponseData::Stats { .. }
            }
        ));

        let response = handler
            .handle(Request::ReadResource {
                uri: "index://secrets".to_string(),
            })
            .await;
        assert!(matches!(
            response,
            Response::Error {
                kind: ErrorKind::UnknownResource,
                ..
            }
        ));
    }
}
