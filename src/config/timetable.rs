use crate::{
    data::class::FlattenedClass,
    error::{DecodeTimetableSnafu, FetchTimetableSnafu, ReadTimetableSnafu, VirtueResult},
};
use snafu::ResultExt;
use std::path::PathBuf;

///where the flattened class list lives. the timetable is owned elsewhere, we only ever read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimetableSource {
    File(PathBuf),
    Remote(String),
}

impl TimetableSource {
    pub fn from_setting(setting: String) -> Self {
        if setting.starts_with("http://") || setting.starts_with("https://") {
            Self::Remote(setting)
        } else {
            Self::File(setting.into())
        }
    }

    pub async fn fetch(&self, client: &reqwest::Client) -> VirtueResult<Vec<FlattenedClass>> {
        match self {
            Self::File(path) => {
                let contents = tokio::fs::read(path)
                    .await
                    .context(ReadTimetableSnafu { path: path.clone() })?;
                serde_json::from_slice(&contents).context(DecodeTimetableSnafu)
            }
            Self::Remote(url) => client
                .get(url)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .context(FetchTimetableSnafu { url: url.clone() })?
                .json()
                .await
                .context(FetchTimetableSnafu { url: url.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VirtueError;

    #[test]
    fn urls_are_remote_and_everything_else_is_a_file() {
        assert_eq!(
            TimetableSource::from_setting("https://example.com/api/fetchTimetable".into()),
            TimetableSource::Remote("https://example.com/api/fetchTimetable".into())
        );
        assert_eq!(
            TimetableSource::from_setting("timetable.json".into()),
            TimetableSource::File("timetable.json".into())
        );
    }

    #[tokio::test]
    async fn reads_the_bundled_timetable() {
        let source = TimetableSource::File(concat!(env!("CARGO_MANIFEST_DIR"), "/timetable.json").into());
        let classes = source.fetch(&reqwest::Client::new()).await.unwrap();
        assert!(!classes.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_a_read_error() {
        let source = TimetableSource::File("/definitely/not/here.json".into());
        let err = source.fetch(&reqwest::Client::new()).await.unwrap_err();
        assert!(matches!(err, VirtueError::ReadTimetable { .. }));
    }
}
