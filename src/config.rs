// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, str::FromStr, sync::Arc, time::Duration};

use crate::{
    common::i18n::I18nStore,
    db::{
        CustomerRepository, InventoryRepository, OrderRepository, ReportRepository,
        RoleRepository, UserRepository, WarehouseRepository,
    },
    services::{
        auth::AuthService, customer_service::CustomerService,
        inventory_service::InventoryService, mailer::LogMailer, order_service::OrderService,
        provisioning_service::ProvisioningService, report_service::ReportService,
        warehouse_service::WarehouseService,
    },
};

/// Configuração lida do ambiente (e do `.env`, quando existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub database_acquire_timeout: Duration,
    pub jwt_ttl_hours: i64,
    pub auth_token_ttl_minutes: i64,
    pub portal_base_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de qualquer fonte de chaves (usado nos testes).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET deve ter pelo menos 32 caracteres");
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            database_acquire_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                3,
            )?),
            jwt_ttl_hours: parse_or(&lookup, "JWT_TTL_HOURS", 168)?,
            auth_token_ttl_minutes: parse_or(&lookup, "AUTH_TOKEN_TTL_MINUTES", 60)?,
            portal_base_url: lookup("PORTAL_BASE_URL")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: '{}'", key, raw)),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub provisioning_service: ProvisioningService,
    pub customer_service: CustomerService,
    pub warehouse_service: WarehouseService,
    pub inventory_service: InventoryService,
    pub order_service: OrderService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.database_acquire_timeout)
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::from_pool(db_pool, config)
    }

    /// Monta o gráfico de dependências sobre um pool já criado.
    pub fn from_pool(db_pool: PgPool, config: Config) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let user_repo = UserRepository::new(db_pool.clone());
        let role_repo = RoleRepository::new(db_pool.clone());
        let order_repo = OrderRepository;
        let inventory_repo = InventoryRepository;

        let auth_service = AuthService::new(
            user_repo.clone(),
            role_repo.clone(),
            Arc::new(LogMailer),
            db_pool.clone(),
            &config,
        );

        Ok(Self {
            auth_service,
            provisioning_service: ProvisioningService::new(user_repo, role_repo),
            customer_service: CustomerService::new(CustomerRepository),
            warehouse_service: WarehouseService::new(WarehouseRepository),
            inventory_service: InventoryService::new(inventory_repo.clone()),
            order_service: OrderService::new(order_repo.clone(), inventory_repo),
            report_service: ReportService::new(ReportRepository, order_repo),
            i18n_store,
            config: Arc::new(config),
            db_pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wms"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.jwt_ttl_hours, 168);
        assert_eq!(config.auth_token_ttl_minutes, 60);
        assert_eq!(config.portal_base_url, "http://localhost:5173");
    }

    #[test]
    fn missing_database_url_fails() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wms"),
            ("JWT_SECRET", "curto"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn invalid_numbers_name_the_variable() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/wms"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_HOURS", "uma semana"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_TTL_HOURS"));
    }
}
