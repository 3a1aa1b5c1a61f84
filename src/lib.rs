pub mod api_docs;
pub mod app;
pub mod app_state;
pub mod config;
pub mod database;
pub mod enums;
pub mod errors;

pub mod core {
    pub mod cache {
        pub mod redis_emitter;
    }
    pub mod channels;
    pub mod dispatcher;
    pub mod jwt_auth {
        pub mod jwt_auth;
        pub mod types;
    }
    pub mod middleware {
        pub mod http_logger;
    }
    pub mod presence;
}

pub mod models {
    pub mod accounts;
    pub mod notifications;
    pub mod push_subscriptions;
}

pub mod routes {
    pub mod health {
        pub mod route;
    }
    pub mod notification {
        pub mod dto;
        pub mod route;
    }
    pub mod subscription {
        pub mod dtos {
            pub mod requests;
        }
        pub mod route;
    }
}

pub mod utils {
    pub mod extractor;
    pub mod models;
    pub mod pagination;
    pub mod tracing;
}
