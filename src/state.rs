use crate::{
    auth::VirtueSession,
    config::{RuntimeConfiguration, StoreKind},
    data::class::FlattenedClass,
    error::VirtueResult,
    maud_conveniences::render_nav,
    store::{Store, memory::MemoryStore, postgres::PostgresStore},
};
use maud::{DOCTYPE, Markup, html};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct VirtueState {
    store: Arc<dyn Store>,
    config: RuntimeConfiguration,
    http_client: reqwest::Client,
}

impl VirtueState {
    pub async fn new(options: PgPoolOptions, config: RuntimeConfiguration) -> VirtueResult<Self> {
        let store: Arc<dyn Store> = match (config.store_kind(), config.db_config()) {
            (StoreKind::Postgres, Some(db_config)) => {
                Arc::new(PostgresStore::connect(options, &db_config).await?)
            }
            (StoreKind::Postgres, None) | (StoreKind::Memory, _) => {
                warn!("Using in-memory store, nothing will be persisted");
                Arc::new(MemoryStore::default())
            }
        };

        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: Arc<dyn Store>, config: RuntimeConfiguration) -> Self {
        Self {
            store,
            config,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub async fn fetch_timetable(&self) -> VirtueResult<Vec<FlattenedClass>> {
        self.config
            .timetable_source()
            .fetch(&self.http_client)
            .await
    }

    #[allow(clippy::unused_self, clippy::needless_pass_by_value)] //in case self is ever needed :), and to allow direct html! usage
    pub fn render(&self, session: VirtueSession, markup: Markup) -> Markup {
        let nav = render_nav(session.user.as_ref());

        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    meta name="description" content="Virtue Movement" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Virtue Movement" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    (nav)
                    main class="w-full flex flex-col items-center justify-center grow p-4" {
                        (markup)
                    }
                }
            }
        }
    }

    pub async fn sensible_shutdown(&self) {
        self.store.close().await;
    }
}
