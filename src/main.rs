use chrono::Utc;
use clap::Parser;
use renoquote::config::cli::{Cli, Command};
use renoquote::core::checkout::OrderDetails;
use renoquote::domain::model::{OrderRecord, PaymentMethod};
use renoquote::utils::{logger, validation::Validate};
use renoquote::{ApiClient, CheckoutFlow, LocalStorage, QuoteCalculator, QuoteError, QuoteStore, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting renoquote CLI");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    // 載入並驗證配置
    let settings = match &cli.config {
        Some(path) => match Settings::from_file(path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::error!("❌ Failed to load settings: {}", e);
                eprintln!("❌ {}", e.user_friendly_message());
                std::process::exit(3);
            }
        },
        None => Settings::default(),
    };

    if let Err(e) = settings.validate() {
        tracing::error!("❌ Settings validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(3);
    }

    match run(cli, settings).await {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::error!(
                "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                renoquote::utils::error::ErrorSeverity::Low => 0,
                renoquote::utils::error::ErrorSeverity::Medium => 2,
                renoquote::utils::error::ErrorSeverity::High => 1,
                renoquote::utils::error::ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
            Ok(())
        }
    }
}

async fn run(cli: Cli, settings: Settings) -> renoquote::Result<()> {
    let storage = LocalStorage::new(settings.storage.base_path.clone());
    let store = QuoteStore::new(storage.clone());
    let api = ApiClient::new(&settings.api, storage)?;

    match cli.command {
        Command::Styles => {
            let styles = api.fetch_styles().await?;
            if styles.is_empty() {
                println!("Каталог стилей пуст.");
                return Ok(());
            }
            for style in styles.iter().filter(|s| s.is_active) {
                println!(
                    "{:>6}  {}  {} сом/м²  (срок x{})",
                    style.id, style.name, style.price_per_sqm, style.time_multiplier
                );
            }
        }

        Command::Calc {
            area,
            style,
            payment,
            months,
            estimate,
        } => {
            let styles = api.fetch_styles().await?;
            let selected = styles
                .iter()
                .find(|s| s.id == style || s.name.eq_ignore_ascii_case(&style))
                .ok_or_else(|| QuoteError::ValidationError {
                    field: "style".to_string(),
                    message: format!("Unknown style '{}'; run `renoquote styles`", style),
                })?;

            let calculator = QuoteCalculator::new(settings.pricing.clone());
            let quote = calculator.compute_quote(area, selected, payment, months)?;

            store.save_last_quote(&quote).await?;
            store.append_quote_history(&quote).await?;
            store.save_selected_service(&selected.id).await?;

            println!("✅ Расчет готов:");
            println!("   {} м² • {}", quote.area_sqm, quote.style_name);
            println!("   Стоимость: {} сом", quote.total_cost);
            println!("   Срок работ: {} дней", quote.estimated_days);
            if let Some(monthly) = quote.monthly_payment() {
                println!(
                    "   Рассрочка: {} сом/мес на {} месяцев",
                    monthly,
                    quote.installment_months.unwrap_or_default()
                );
            }

            if let Some(path) = estimate {
                std::fs::write(&path, serde_json::to_string_pretty(&quote)?)?;
                println!("📁 Смета сохранена: {}", path.display());
            }
        }

        Command::History => {
            let history = store.load_quote_history().await;
            if history.is_empty() {
                println!("История расчетов пуста.");
                return Ok(());
            }
            for entry in &history {
                println!(
                    "{}  {} м² • {}  {} сом  ({} дней)",
                    entry.saved_at.format("%Y-%m-%d %H:%M"),
                    entry.quote.area_sqm,
                    entry.quote.style_name,
                    entry.quote.total_cost,
                    entry.quote.estimated_days
                );
            }
        }

        Command::Order {
            phone,
            address,
            start_date,
            end_date,
            payment,
            months,
        } => {
            let saved_quote = store.load_last_quote().await;
            if saved_quote.is_none() {
                tracing::warn!("No saved quote; order dates and totals use configured defaults");
            }

            let mut flow = CheckoutFlow::new(
                settings.pricing.clone(),
                settings.financing.clone(),
                saved_quote,
            );
            flow.select_payment(payment)?;
            if payment == PaymentMethod::Installment {
                let term = months.unwrap_or(settings.financing.default_term);
                flow.choose_term(term)?;
                for option in flow.installment_options() {
                    println!(
                        "   {} месяцев: {} сом/мес (итого {} сом)",
                        option.months, option.monthly_payment, option.total_amount
                    );
                }
            }

            let details = OrderDetails {
                phone,
                address,
                start_date,
                end_date,
                ..OrderDetails::default()
            };
            let request = flow.order_request(&details, Utc::now().date_naive())?;
            let order_id = api.submit_order(&request).await?;

            let installment_months = flow.payment_selection().and_then(|(_, m)| m);
            store
                .append_order_history(&OrderRecord {
                    order_id: order_id.clone(),
                    request,
                    payment_method: payment,
                    installment_months,
                    status: Default::default(),
                    submitted_at: Utc::now(),
                })
                .await?;
            flow.complete(order_id.clone())?;

            println!("✅ Заявка принята, номер заказа: {}", order_id);
        }

        Command::Login { phone, password } => {
            api.login(&phone, &password).await?;
            println!("✅ Вход выполнен.");
        }

        Command::Logout => {
            api.logout().await?;
            println!("✅ Сессия завершена.");
        }
    }

    Ok(())
}
