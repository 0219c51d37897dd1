use mongodb::Database;

use crate::clients::ServiceClients;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub clients: ServiceClients,
}
