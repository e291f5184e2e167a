use crate::settings::Settings;

pub fn get_clickhouse_client(settings: &Settings) -> clickhouse::Client {
    clickhouse::Client::default()
        .with_url(settings.clickhouse_url.clone())
        .with_user(settings.clickhouse_user.clone())
        .with_password(settings.clickhouse_password.clone())
        .with_database(settings.clickhouse_database.clone())
}
