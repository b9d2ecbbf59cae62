//! Caribou Client - Entry Point
//!
//! Headless client for the Caribou earn, mint, swap and prediction
//! products on Scroll. Results are printed to stdout as JSON; logs go
//! to stderr as JSON tracing events.
//!
//! Wiring sequence:
//! 1. Parse arguments and load config.toml
//! 2. Init tracing (JSON structured logging)
//! 3. Connect the Scroll provider with the session from env
//!    (PRIVATE_KEY or WALLET_ADDRESS)
//! 4. Wrap the chain client in the dry-run adapter if configured
//! 5. Dispatch the command; `monitor` runs until SIGINT

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use anyhow::{Context, Result, bail};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use caribou_client::adapters::chain::{
    DryRunChainClient, RegistryValidator, ScrollChainClient, ScrollProvider,
};
use caribou_client::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use caribou_client::adapters::notify::TracingNotifier;
use caribou_client::adapters::persistence::ActionLogStore;
use caribou_client::config::{self, AppConfig};
use caribou_client::domain::market::{
    EARN_MARKETS, earn_market, nft_collection, prediction_market, registry_addresses, swap_token,
};
use caribou_client::domain::prediction::BetSide;
use caribou_client::ports::chain_client::ChainClient;
use caribou_client::ports::notifier::Notifier;
use caribou_client::ports::repository::ActionRepository;
use caribou_client::usecases::balance_reconciler::BalanceReconciler;
use caribou_client::usecases::earn::EarnCard;
use caribou_client::usecases::mint::NftMinter;
use caribou_client::usecases::points::PointsTracker;
use caribou_client::usecases::portfolio::Portfolio;
use caribou_client::usecases::prediction::PredictionDesk;
use caribou_client::usecases::submission::{SubmitOutcome, TxSubmitter};
use caribou_client::usecases::swap::Swapper;

const USAGE: &str = "usage: caribou-client [--config PATH] <command>

commands:
  balances                       supplied and wallet balance per earn market
  deposit  <market> <amount|N%>  deposit into an earn market (index or rho/lore/aave)
  withdraw <market> <amount|N%>  withdraw from an earn market
  mint     <collection>          mint an NFT (index or name)
  swap     <in> <out> <amount>   swap tokens via the router (WETH, USDC, USDT, SCROLL)
  bet      <market> <yes|no>     place a fixed-stake prediction bet (index or address)
  odds     [market]              pot split of one or all prediction markets
  portfolio                      NFT holdings and earn positions
  points                         cosmetic points total
  monitor                        serve metrics and refresh balances until Ctrl-C
  validate                       check registry addresses have code on-chain";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Balances,
    Deposit { market: String, amount: String },
    Withdraw { market: String, amount: String },
    Mint { collection: String },
    Swap { token_in: String, token_out: String, amount: String },
    Bet { market: String, side: BetSide },
    Odds { market: Option<String> },
    Portfolio,
    Points,
    Monitor,
    Validate,
}

impl Command {
    /// Commands that submit transactions.
    const fn is_write(&self) -> bool {
        matches!(
            self,
            Self::Deposit { .. }
                | Self::Withdraw { .. }
                | Self::Mint { .. }
                | Self::Swap { .. }
                | Self::Bet { .. }
        )
    }
}

/// Split `--config PATH` from the command words.
fn parse_args(args: &[String]) -> Result<(String, Command)> {
    let mut config_path = "config.toml".to_string();
    let mut rest = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-c" {
            config_path = iter.next().context("--config needs a path")?.clone();
        } else {
            rest.push(arg.as_str());
        }
    }
    Ok((config_path, parse_command(&rest)?))
}

fn parse_command(words: &[&str]) -> Result<Command> {
    let cmd = match words {
        ["balances"] => Command::Balances,
        ["deposit", market, amount] => Command::Deposit {
            market: (*market).to_string(),
            amount: (*amount).to_string(),
        },
        ["withdraw", market, amount] => Command::Withdraw {
            market: (*market).to_string(),
            amount: (*amount).to_string(),
        },
        ["mint", collection] => Command::Mint {
            collection: (*collection).to_string(),
        },
        ["swap", token_in, token_out, amount] => Command::Swap {
            token_in: (*token_in).to_string(),
            token_out: (*token_out).to_string(),
            amount: (*amount).to_string(),
        },
        ["bet", market, side] => Command::Bet {
            market: (*market).to_string(),
            side: side.parse().map_err(anyhow::Error::msg)?,
        },
        ["odds"] => Command::Odds { market: None },
        ["odds", market] => Command::Odds {
            market: Some((*market).to_string()),
        },
        ["portfolio"] => Command::Portfolio,
        ["points"] => Command::Points,
        ["monitor"] => Command::Monitor,
        ["validate"] => Command::Validate,
        _ => bail!("{USAGE}"),
    };
    Ok(cmd)
}

/// Shared services for every command.
struct App<C: ChainClient> {
    config: AppConfig,
    chain: Arc<C>,
    submitter: Arc<TxSubmitter<C>>,
    repo: Arc<ActionLogStore>,
    points: PointsTracker,
    metrics: Option<Arc<MetricsRegistry>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, command) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging (stderr) ──────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.client.log_level)),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(
        name = %config.client.name,
        version = env!("CARGO_PKG_VERSION"),
        dry_run = config.client.dry_run,
        command = ?command,
        "Starting Caribou client"
    );

    // ── 3. Connect provider and wallet session ──────────────
    let provider = Arc::new(
        ScrollProvider::connect(&config.network)
            .await
            .context("Failed to connect to Scroll RPC")?,
    );

    if command == Command::Validate {
        return validate(&provider).await;
    }

    if command.is_write() && !provider.session().can_sign() && !config.client.dry_run {
        warn!(session = ?provider.session(), "Session cannot sign; this command will fail");
    }

    // ── 4. Chain client, optionally dry-run ─────────────────
    let client = Arc::new(ScrollChainClient::new(Arc::clone(&provider)));
    if config.client.dry_run {
        warn!("Dry-run mode - transactions are built and logged but NOT sent");
        let app = App::build(config, Arc::new(DryRunChainClient::new(client))).await?;
        app.dispatch(command).await
    } else {
        let app = App::build(config, client).await?;
        app.dispatch(command).await
    }
}

async fn validate(provider: &ScrollProvider) -> Result<()> {
    let validator = RegistryValidator::new(provider.inner());
    let results = validator.validate_all(&registry_addresses()).await?;
    let missing: Vec<&str> = results
        .iter()
        .filter(|r| !r.has_code)
        .map(|r| r.name.as_str())
        .collect();

    print_json(&json!({
        "chain_id": provider.chain_id(),
        "validated": results.len(),
        "missing": missing,
    }));

    if !missing.is_empty() {
        bail!("{} registry addresses have no code", missing.len());
    }
    Ok(())
}

impl<C: ChainClient> App<C> {
    async fn build(config: AppConfig, chain: Arc<C>) -> Result<Self> {
        let metrics = if config.metrics.enabled {
            Some(Arc::new(MetricsRegistry::new().context("Failed to create metrics registry")?))
        } else {
            None
        };

        let mut notifier = TracingNotifier::new();
        if let Some(m) = &metrics {
            notifier = notifier.with_metrics(Arc::clone(m));
        }
        let notifier: Arc<dyn Notifier> = Arc::new(notifier);

        let repo = Arc::new(
            ActionLogStore::new(&config.persistence.data_dir)
                .await
                .context("Failed to open action log")?,
        );
        info!(path = %repo.path().display(), "Action log ready");
        let points = PointsTracker::new(Arc::clone(&repo) as Arc<dyn ActionRepository>);
        let submitter = Arc::new(TxSubmitter::new(Arc::clone(&chain), notifier));

        Ok(Self {
            config,
            chain,
            submitter,
            repo,
            points,
            metrics,
        })
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::Balances => self.balances().await,
            Command::Deposit { market, amount } => self.deposit(&market, &amount).await,
            Command::Withdraw { market, amount } => self.withdraw(&market, &amount).await,
            Command::Mint { collection } => self.mint(&collection).await,
            Command::Swap {
                token_in,
                token_out,
                amount,
            } => self.swap(&token_in, &token_out, &amount).await,
            Command::Bet { market, side } => self.bet(&market, side).await,
            Command::Odds { market } => self.odds(market.as_deref()).await,
            Command::Portfolio => self.portfolio().await,
            Command::Points => self.points().await,
            Command::Monitor => self.monitor().await,
            Command::Validate => Ok(()),
        }
    }

    fn account(&self) -> Result<Address> {
        self.chain
            .account()
            .context("No wallet session: set PRIVATE_KEY or WALLET_ADDRESS")
    }

    fn earn_card(&self, key: &str) -> Result<EarnCard<C>> {
        let market = earn_market(key).with_context(|| format!("Unknown earn market {key:?}"))?;
        Ok(EarnCard::new(
            market,
            BalanceReconciler::new(Arc::clone(&self.chain)),
            Arc::clone(&self.submitter),
        )
        .with_points(self.points.clone()))
    }

    async fn balances(&self) -> Result<()> {
        self.account()?;
        let reconciler = &BalanceReconciler::new(Arc::clone(&self.chain));
        let reads = EARN_MARKETS
            .iter()
            .map(|m| async move { (m, reconciler.reconcile(m).await) });
        let rows = futures_util::future::join_all(reads)
            .await
            .into_iter()
            .map(|(market, balances)| {
                let (supplied, wallet) = balances
                    .map(|b| (b.supplied().to_string(), b.wallet.to_string()))
                    .unwrap_or_default();
                json!({
                    "market": market.name,
                    "protocol": market.protocol.label(),
                    "asset": market.asset,
                    "apy": market.apy,
                    "supplied": supplied,
                    "wallet": wallet,
                })
            })
            .collect();
        print_json(&Value::Array(rows));
        Ok(())
    }

    async fn deposit(&self, key: &str, amount: &str) -> Result<()> {
        let card = self.earn_card(key)?;
        card.refresh().await;
        let outcome = card.deposit(amount).await?;
        let state = card.snapshot().await;
        print_json(&json!({
            "market": card.market().name,
            "protocol": card.market().protocol.label(),
            "outcome": outcome_json(&outcome),
            "supplied": state.supplied.to_string(),
            "wallet": state.wallet.to_string(),
        }));
        Ok(())
    }

    async fn withdraw(&self, key: &str, amount: &str) -> Result<()> {
        let card = self.earn_card(key)?;
        card.refresh().await;
        let outcome = card.withdraw(amount).await?;
        let state = card.snapshot().await;
        print_json(&json!({
            "market": card.market().name,
            "protocol": card.market().protocol.label(),
            "outcome": outcome_json(&outcome),
            "supplied": state.supplied.to_string(),
            "wallet": state.wallet.to_string(),
        }));
        Ok(())
    }

    async fn mint(&self, key: &str) -> Result<()> {
        let collection =
            nft_collection(key).with_context(|| format!("Unknown NFT collection {key:?}"))?;
        let minter = NftMinter::new(Arc::clone(&self.submitter)).with_points(self.points.clone());
        let outcome = minter.mint(collection).await?;
        print_json(&json!({
            "collection": collection.name,
            "outcome": outcome_json(&outcome),
        }));
        Ok(())
    }

    async fn swap(&self, token_in: &str, token_out: &str, amount: &str) -> Result<()> {
        let t_in = swap_token(token_in).with_context(|| format!("Unknown token {token_in:?}"))?;
        let t_out = swap_token(token_out).with_context(|| format!("Unknown token {token_out:?}"))?;
        let swapper = Swapper::new(Arc::clone(&self.chain), Arc::clone(&self.submitter));

        let available = swapper.input_balance(t_in).await;
        info!(token = t_in.symbol, available = %available, "Input balance");

        let outcome = swapper.swap(t_in, t_out, amount).await?;
        print_json(&json!({
            "from": t_in.symbol,
            "to": t_out.symbol,
            "amount": amount,
            "outcome": outcome_json(&outcome),
        }));
        Ok(())
    }

    fn desk(&self) -> PredictionDesk<C> {
        PredictionDesk::new(Arc::clone(&self.chain), Arc::clone(&self.submitter))
            .with_points(self.points.clone())
    }

    async fn bet(&self, key: &str, side: BetSide) -> Result<()> {
        let market =
            prediction_market(key).with_context(|| format!("Unknown prediction market {key:?}"))?;
        let result = self.desk().bet(market, side).await?;
        let totals = result.totals.map(|t| {
            json!({
                "yes": t.true_percentage().to_string(),
                "no": t.false_percentage().to_string(),
            })
        });
        print_json(&json!({
            "market": market.to_string(),
            "side": side.to_string(),
            "outcome": outcome_json(&result.outcome),
            "odds": totals,
        }));
        Ok(())
    }

    async fn odds(&self, key: Option<&str>) -> Result<()> {
        let desk = self.desk();
        let listings = match key {
            Some(k) => {
                let address =
                    prediction_market(k).with_context(|| format!("Unknown prediction market {k:?}"))?;
                let listing = desk.listing(address).await;
                vec![(listing.address, listing.description)]
            }
            None => desk
                .markets()
                .await
                .into_iter()
                .map(|l| (l.address, l.description))
                .collect(),
        };

        let mut rows = Vec::new();
        for (address, description) in listings {
            let row = match desk.odds(address).await {
                Ok(t) => {
                    let mine = desk.my_stakes(address).await.ok();
                    json!({
                        "market": address.to_string(),
                        "description": description,
                        "yes": t.true_percentage().to_string(),
                        "no": t.false_percentage().to_string(),
                        "leading": if t.is_yes_leading() { "yes" } else { "no" },
                        "pot_wei": t.total().to_string(),
                        "my_yes_wei": mine.as_ref().map(|m| m.total_true.to_string()),
                        "my_no_wei": mine.as_ref().map(|m| m.total_false.to_string()),
                    })
                }
                Err(e) => {
                    warn!(market = %address, error = %e, "Failed to read odds");
                    json!({
                        "market": address.to_string(),
                        "description": description,
                        "error": e.to_string(),
                    })
                }
            };
            rows.push(row);
        }
        print_json(&Value::Array(rows));
        Ok(())
    }

    async fn portfolio(&self) -> Result<()> {
        self.account()?;
        let portfolio = Portfolio::new(Arc::clone(&self.chain));
        let (nfts, positions) = tokio::join!(portfolio.nft_holdings(), portfolio.earn_positions());

        let nfts: Vec<Value> = nfts
            .iter()
            .map(|h| json!({ "name": h.name, "image": h.image_url, "amount": h.amount.to_string() }))
            .collect();
        let positions: Vec<Value> = positions
            .iter()
            .map(|p| {
                json!({
                    "market": p.market.name,
                    "protocol": p.market.protocol.label(),
                    "asset": p.market.asset,
                    "supplied": p.supplied.to_string(),
                })
            })
            .collect();

        print_json(&json!({ "nfts": nfts, "earn": positions }));
        Ok(())
    }

    async fn points(&self) -> Result<()> {
        let account = self.account()?;
        let total = self.points.total(account).await;
        print_json(&json!({ "address": account.to_string(), "points": total }));
        Ok(())
    }

    /// Serve metrics and health checks, refreshing balances on a timer
    /// until Ctrl-C.
    async fn monitor(&self) -> Result<()> {
        let account = self.account()?;
        let (shutdown_tx, _) = broadcast::channel::<()>(1);
        let health = Arc::new(HealthState::new());

        let metrics_handle = self.metrics.as_ref().map(|m| {
            let rx = shutdown_tx.subscribe();
            let bind = self.config.metrics.bind_address.clone();
            tokio::spawn(Arc::clone(m).serve(bind, rx))
        });

        let health_server = HealthServer::new(Arc::clone(&health), self.config.metrics.health_port);
        let health_handle = tokio::spawn(health_server.run(shutdown_tx.subscribe()));

        let reconciler = BalanceReconciler::new(Arc::clone(&self.chain));
        let mut ticker =
            tokio::time::interval(Duration::from_secs(self.config.metrics.refresh_seconds));
        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);

        info!(account = %account, refresh = self.config.metrics.refresh_seconds, "Monitor running");

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("SIGINT received, shutting down monitor");
                    break;
                }
                _ = ticker.tick() => {
                    self.refresh_metrics(&reconciler, account, &health).await;
                }
            }
        }

        health.stop();
        let _ = shutdown_tx.send(());

        for handle in metrics_handle.into_iter().chain(std::iter::once(health_handle)) {
            match tokio::time::timeout(Duration::from_secs(5), handle).await {
                Ok(Ok(Err(e))) => error!(error = %e, "Server task failed"),
                Ok(Err(e)) => error!(error = %e, "Server task panicked"),
                Err(_) => warn!("Server task did not stop in time"),
                Ok(Ok(Ok(()))) => {}
            }
        }

        info!("Shutdown complete");
        Ok(())
    }

    async fn refresh_metrics(&self, reconciler: &BalanceReconciler<C>, account: Address, health: &HealthState) {
        let (chain_ok, store_ok) = tokio::join!(self.chain.is_healthy(), self.repo.is_healthy());
        health.set_chain(chain_ok);
        health.set_store(store_ok);

        let reads = EARN_MARKETS.iter().map(|m| async move { (m, reconciler.reconcile(m).await) });
        let results = futures_util::future::join_all(reads).await;

        let Some(metrics) = &self.metrics else {
            return;
        };

        for (market, balances) in results {
            let Some(balances) = balances else { continue };
            let protocol = market.protocol.label();

            match balances.supplied().as_decimal().and_then(|d| d.to_f64()) {
                Some(v) => metrics
                    .supplied_balance
                    .with_label_values(&[market.name, protocol])
                    .set(v),
                None => metrics
                    .read_errors
                    .with_label_values(&[market.name, "supplied"])
                    .inc(),
            }
            match balances.wallet.as_decimal().and_then(|d| d.to_f64()) {
                Some(v) => metrics
                    .wallet_balance
                    .with_label_values(&[market.name, market.asset])
                    .set(v),
                None => metrics
                    .read_errors
                    .with_label_values(&[market.name, "wallet"])
                    .inc(),
            }
        }

        let total = self.points.total(account).await;
        #[allow(clippy::cast_precision_loss)]
        metrics
            .points_total
            .with_label_values(&[&account.to_string()])
            .set(total as f64);
    }
}

fn outcome_json(outcome: &SubmitOutcome) -> Value {
    match outcome {
        SubmitOutcome::Skipped => json!({ "status": "skipped" }),
        SubmitOutcome::Confirmed { tx_hash } => json!({ "status": "confirmed", "tx_hash": tx_hash }),
        SubmitOutcome::Reverted { tx_hash } => json!({ "status": "reverted", "tx_hash": tx_hash }),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => error!(error = %e, "Failed to render output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    #[test]
    fn test_parse_config_flag_anywhere() {
        let (path, cmd) = parse_args(&args("balances --config /etc/caribou.toml")).unwrap();
        assert_eq!(path, "/etc/caribou.toml");
        assert_eq!(cmd, Command::Balances);
    }

    #[test]
    fn test_parse_deposit_and_bet() {
        let (path, cmd) = parse_args(&args("deposit aave 50%")).unwrap();
        assert_eq!(path, "config.toml");
        assert_eq!(
            cmd,
            Command::Deposit {
                market: "aave".into(),
                amount: "50%".into()
            }
        );

        let (_, cmd) = parse_args(&args("bet 0 yes")).unwrap();
        assert_eq!(
            cmd,
            Command::Bet {
                market: "0".into(),
                side: BetSide::True
            }
        );
    }

    #[test]
    fn test_write_commands() {
        let (_, cmd) = parse_args(&args("swap WETH USDC 0.5")).unwrap();
        assert!(cmd.is_write());
        let (_, cmd) = parse_args(&args("mint 0")).unwrap();
        assert!(cmd.is_write());
        let (_, cmd) = parse_args(&args("odds")).unwrap();
        assert!(!cmd.is_write());
        assert!(!Command::Portfolio.is_write());
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(parse_args(&args("launch rockets")).is_err());
        assert!(parse_args(&args("bet 0 maybe")).is_err());
        assert!(parse_args(&args("--config")).is_err());
    }
}
