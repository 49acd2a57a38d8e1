use warden_database::Database;
use warden_utils::pagination::PaginationService;

pub type Error = anyhow::Error;

#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    pub pagination: PaginationService,
    pub http_client: reqwest::Client,
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
