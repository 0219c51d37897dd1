use anyhow::Result;
use mongodb::{
    Client, Database, IndexModel,
    bson::doc,
    options::{ClientOptions, IndexOptions},
};

use crate::models::User;

pub async fn connect(database_url: &str, database_name: &str) -> Result<Database> {
    let options = ClientOptions::parse(database_url).await?;
    let client = Client::with_options(options)?;
    Ok(client.database(database_name))
}

/// Index creation is idempotent; called once at user-service startup.
pub async fn ensure_user_indexes(db: &Database) -> Result<()> {
    let options = IndexOptions::builder().unique(true).build();
    let index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(options)
        .build();
    db.collection::<User>("user").create_index(index, None).await?;
    Ok(())
}
