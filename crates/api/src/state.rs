use mongodb::Database;
use shoply_config::Settings;
use shoply_services::{
    AuthService,
    dao::{
        catalog::CatalogDao, invite::InviteDao, item::ItemDao, list::ListDao,
        member::MemberDao, notification::NotificationDao, push_token::PushTokenDao,
        user::UserDao,
    },
};
use std::sync::Arc;

use crate::ws::storage::WsStorage;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserDao>,
    pub lists: Arc<ListDao>,
    pub items: Arc<ItemDao>,
    pub members: Arc<MemberDao>,
    pub invites: Arc<InviteDao>,
    pub catalog: Arc<CatalogDao>,
    pub push_tokens: Arc<PushTokenDao>,
    pub notifications: Arc<NotificationDao>,
    pub ws_storage: Arc<WsStorage>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone()));
        let users = Arc::new(UserDao::new(&db));
        let lists = Arc::new(ListDao::new(&db));
        let items = Arc::new(ItemDao::new(&db));
        let members = Arc::new(MemberDao::new(&db));
        let invites = Arc::new(InviteDao::new(&db));
        let catalog = Arc::new(CatalogDao::new(&db));
        let push_tokens = Arc::new(PushTokenDao::new(&db));
        let notifications = Arc::new(NotificationDao::new(&db));
        let ws_storage = Arc::new(WsStorage::new());

        Self {
            db,
            settings,
            auth,
            users,
            lists,
            items,
            members,
            invites,
            catalog,
            push_tokens,
            notifications,
            ws_storage,
        }
    }
}
