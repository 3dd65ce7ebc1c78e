use log::{info, warn};
use mongodb::{
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

pub const DATABASE: &str = "Itineraries";

pub async fn create_mongo_client(uri: &str) -> mongodb::error::Result<Arc<Client>> {
    info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    // Server API versioning needs MongoDB 5.0+
    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    match client
        .database(DATABASE)
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
    {
        Ok(_) => info!("Connected to MongoDB and verified with ping"),
        Err(e) => {
            warn!("Connected to MongoDB but ping failed: {}", e);
            warn!("Itineraries will still be generated, but sharing may be unavailable");
        }
    }

    Ok(Arc::new(client))
}
