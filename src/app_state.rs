use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use mongodb::Database;

use crate::config::APP_CONFIG;
use crate::core::channels::ChannelSender;
use crate::core::channels::email::EmailSender;
use crate::core::channels::push::PushSender;
use crate::core::channels::realtime::RealtimeSender;
use crate::core::channels::whatsapp::WhatsappSender;
use crate::core::dispatcher::{DeliveryCoordinator, DeliveryPolicy};
use crate::core::presence::PresenceRegistry;
use crate::database;

#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub presence: Arc<PresenceRegistry>,
    pub coordinator: Arc<DeliveryCoordinator>,
}

impl AppState {
    pub async fn init() -> eyre::Result<Self> {
        let database = database::connection().await.clone();
        let presence = Arc::new(PresenceRegistry::new());

        let senders: Vec<Arc<dyn ChannelSender>> = vec![
            Arc::new(RealtimeSender::new(presence.clone())),
            Arc::new(PushSender::new()?),
            Arc::new(WhatsappSender::new()),
            Arc::new(EmailSender::new()),
        ];

        let coordinator = Arc::new(DeliveryCoordinator::new(
            DeliveryPolicy::default(),
            senders,
            Duration::from_secs(APP_CONFIG.channel_timeout_secs),
        ));

        Ok(Self {
            database,
            presence,
            coordinator,
        })
    }
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.database.clone()
    }
}
