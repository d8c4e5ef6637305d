//! Command surface of the binary: one subcommand per store action.

use std::io::{self, Write};

use chrono::NaiveDate;
use clap::Subcommand;
use store::{
    BudgetPeriod, Currency, Gateway, Money, NewBudget, NewCategory, NewExpense,
    NewPet, Recurrence, SettingsPatch, Species, Store,
};
use uuid::Uuid;

use crate::error::{AppError, Result};

const DEFAULT_COLOR: &str = "#9CA3AF";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Totals, budget utilisation and upcoming recurring expenses.
    Summary {
        /// Reference day (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Days ahead to look for recurring expenses.
        #[arg(long, default_value_t = 30)]
        horizon: u64,
    },
    Pets,
    AddPet {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "other")]
        species: Species,
        #[arg(long)]
        breed: Option<String>,
        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },
    /// Delete a pet with its expenses and budgets.
    RemovePet { id: Uuid },
    /// Categories; hidden ones only with `--all`.
    Categories {
        #[arg(long)]
        all: bool,
    },
    /// Building blocks available to `add-category --block`.
    Blocks,
    AddCategory {
        /// Seed the category from a building block.
        #[arg(long)]
        block: Option<String>,
        #[arg(long, required_unless_present = "block")]
        name: Option<String>,
        #[arg(long, default_value = DEFAULT_COLOR)]
        color: String,
        #[arg(long)]
        icon: Option<String>,
    },
    ShowCategory { id: Uuid },
    HideCategory { id: Uuid },
    RemoveCategory { id: Uuid },
    Expenses {
        #[arg(long)]
        pet: Option<Uuid>,
    },
    AddExpense {
        #[arg(long)]
        pet: Uuid,
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        amount: Money,
        /// Defaults to the settings' default currency.
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "none")]
        recurrence: Recurrence,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        receipt: Option<String>,
    },
    RemoveExpense { id: Uuid },
    Budgets {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    AddBudget {
        #[arg(long)]
        pet: Uuid,
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        amount: Money,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long, default_value = "monthly")]
        period: BudgetPeriod,
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    RemoveBudget { id: Uuid },
    /// Show settings, or change the default currency.
    Settings {
        #[arg(long)]
        default_currency: Option<Currency>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Summary {
            date: None,
            horizon: 30,
        }
    }
}

/// Run `command` against an initialised store.
pub async fn run<G: Gateway>(
    store: &mut Store<G>,
    command: Command,
    today: NaiveDate,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Summary { date, horizon } => summary(store, date.unwrap_or(today), horizon, out)?,
        Command::Pets => {
            for pet in store.pets() {
                writeln!(
                    out,
                    "{}  {} ({}{})",
                    pet.id,
                    pet.name,
                    pet.species,
                    pet.breed
                        .as_deref()
                        .map(|breed| format!(", {breed}"))
                        .unwrap_or_default()
                )?;
            }
        }
        Command::AddPet {
            name,
            species,
            breed,
            birth_date,
        } => {
            let pet = store
                .add_pet(NewPet {
                    name,
                    species,
                    breed,
                    birth_date,
                    photo_ref: None,
                })
                .await?;
            writeln!(out, "added pet {} ({})", pet.name, pet.id)?;
        }
        Command::RemovePet { id } => {
            store.delete_pet(id).await;
            settled(store)?;
            writeln!(out, "removed pet {id}")?;
        }
        Command::Categories { all } => {
            let visible: Vec<Uuid> = store
                .get_user_selected_categories()
                .into_iter()
                .map(|category| category.id)
                .collect();
            for category in store.categories() {
                let shown = visible.contains(&category.id);
                if all || shown {
                    let marker = if shown { '*' } else { ' ' };
                    writeln!(out, "{marker} {}  {}", category.id, category.name)?;
                }
            }
        }
        Command::Blocks => {
            for block in store.catalog().blocks() {
                let default = if block.is_default { " (default)" } else { "" };
                writeln!(out, "{:<12} {}{default}", block.key, block.name)?;
            }
        }
        Command::AddCategory {
            block,
            name,
            color,
            icon,
        } => {
            let category = match block {
                Some(key) => store.add_category_from_building_block(&key).await?,
                None => {
                    store
                        .add_category(NewCategory {
                            name: name.unwrap_or_default(),
                            color,
                            icon,
                            builtin_key: None,
                        })
                        .await?
                }
            };
            writeln!(out, "added category {} ({})", category.name, category.id)?;
        }
        Command::ShowCategory { id } => {
            store.set_category_visibility(id, true).await;
            settled(store)?;
        }
        Command::HideCategory { id } => {
            store.set_category_visibility(id, false).await;
            settled(store)?;
        }
        Command::RemoveCategory { id } => {
            store.delete_category(id).await;
            settled(store)?;
            writeln!(out, "removed category {id}")?;
        }
        Command::Expenses { pet } => {
            for expense in store
                .expenses()
                .iter()
                .filter(|expense| pet.is_none_or(|pet| expense.pet_id == pet))
            {
                let category = store
                    .category(expense.category_id)
                    .map_or("?", |category| category.name.as_str());
                writeln!(
                    out,
                    "{}  {}  {} {}  {category}  {}",
                    expense.id,
                    expense.date,
                    expense.amount,
                    expense.currency,
                    expense.recurrence
                )?;
            }
        }
        Command::AddExpense {
            pet,
            category,
            amount,
            currency,
            date,
            recurrence,
            description,
            receipt,
        } => {
            let currency = currency.unwrap_or_else(|| default_currency(store));
            let expense = store
                .add_expense(NewExpense {
                    pet_id: pet,
                    category_id: category,
                    amount,
                    currency,
                    description,
                    date: date.unwrap_or(today),
                    receipt_ref: receipt,
                    recurrence,
                    next_due_date: None,
                })
                .await?;
            writeln!(out, "added expense {}", expense.id)?;
            if let Some(next) = expense.next_due_date {
                writeln!(out, "next due on {next}")?;
            }
        }
        Command::RemoveExpense { id } => {
            store.delete_expense(id).await;
            settled(store)?;
            writeln!(out, "removed expense {id}")?;
        }
        Command::Budgets { date } => budgets(store, date.unwrap_or(today), out)?,
        Command::AddBudget {
            pet,
            category,
            amount,
            currency,
            period,
            start,
        } => {
            let start_date = start.unwrap_or(today);
            let currency = currency.unwrap_or_else(|| default_currency(store));
            let budget = store
                .add_budget(NewBudget {
                    pet_id: pet,
                    category_id: category,
                    amount,
                    currency,
                    period,
                    start_date,
                    end_date: start_date,
                })
                .await?;
            writeln!(
                out,
                "added budget {} ({} to {})",
                budget.id, budget.start_date, budget.end_date
            )?;
        }
        Command::RemoveBudget { id } => {
            store.delete_budget(id).await;
            settled(store)?;
            writeln!(out, "removed budget {id}")?;
        }
        Command::Settings { default_currency } => {
            if let Some(currency) = default_currency {
                store
                    .update_settings(SettingsPatch {
                        default_currency: Some(currency),
                        ..SettingsPatch::default()
                    })
                    .await;
                settled(store)?;
            }
            if let Some(settings) = store.settings() {
                let available: Vec<&str> = settings
                    .available_currencies
                    .iter()
                    .map(|currency| currency.code())
                    .collect();
                writeln!(out, "default currency: {}", settings.default_currency)?;
                writeln!(out, "available: {}", available.join(", "))?;
            }
        }
    }
    Ok(())
}

/// Turn a message left in the error slot into an error.
fn settled<G>(store: &Store<G>) -> Result<()> {
    match store.error() {
        Some(message) => Err(AppError::Action(message.to_string())),
        None => Ok(()),
    }
}

fn default_currency<G>(store: &Store<G>) -> Currency {
    store
        .settings()
        .map(|settings| settings.default_currency)
        .unwrap_or_default()
}

fn summary<G>(store: &Store<G>, day: NaiveDate, horizon: u64, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{} pet(s), {} expense(s), {} budget(s)",
        store.pets().len(),
        store.expenses().len(),
        store.budgets().len()
    )?;
    for (currency, total) in store.total_spent() {
        writeln!(out, "spent: {total} {currency}")?;
    }
    budgets(store, day, out)?;

    let upcoming = store.upcoming_recurring(day, horizon);
    if !upcoming.is_empty() {
        writeln!(out, "due in the next {horizon} days:")?;
    }
    for expense in upcoming {
        if let Some(due) = expense.next_due_date {
            let pet = store.pet(expense.pet_id).map_or("?", |pet| pet.name.as_str());
            writeln!(out, "  {due}  {pet}  {} {}", expense.amount, expense.currency)?;
        }
    }
    Ok(())
}

fn budgets<G>(store: &Store<G>, day: NaiveDate, out: &mut impl Write) -> io::Result<()> {
    for status in store.budget_statuses(day) {
        let Some(budget) = store.budgets().iter().find(|b| b.id == status.budget_id) else {
            continue;
        };
        let pet = store.pet(budget.pet_id).map_or("?", |pet| pet.name.as_str());
        let category = store
            .category(budget.category_id)
            .map_or("?", |category| category.name.as_str());
        writeln!(
            out,
            "{pet} / {category}: {} of {} {} ({:.0}%, {})",
            status.spent,
            status.monthly_equivalent,
            budget.currency,
            status.utilization.percent,
            status.utilization.level.as_str()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gateway::SeaGateway;
    use migration::{Migrator, MigratorTrait};

    use super::*;

    async fn store() -> Store<SeaGateway> {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let gateway = SeaGateway::builder()
            .database(db)
            .user("tester")
            .build()
            .unwrap();
        let mut store = Store::builder(gateway).build();
        store.initialize().await.unwrap();
        store
    }

    async fn exec(store: &mut Store<SeaGateway>, args: &[&str]) -> Result<String> {
        use clap::Parser;

        #[derive(Parser)]
        struct Cli {
            #[command(subcommand)]
            command: Command,
        }

        let cli = Cli::try_parse_from(std::iter::once("pawledger").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        run(store, cli.command, today, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn adds_and_lists_records() {
        let mut store = store().await;

        exec(&mut store, &["add-pet", "--name", "Miso", "--species", "cat"])
            .await
            .unwrap();
        exec(&mut store, &["add-category", "--block", "food"])
            .await
            .unwrap();
        let pet = store.pets()[0].id.to_string();
        let food = store.categories()[0].id.to_string();

        let output = exec(
            &mut store,
            &[
                "add-expense", "--pet", &pet, "--category", &food, "--amount", "19,99",
                "--recurrence", "monthly",
            ],
        )
        .await
        .unwrap();
        assert!(output.contains("next due on 2024-04-15"));
        assert_eq!(store.expenses()[0].amount, Money::new(1_999));
        assert_eq!(store.expenses()[0].currency, Currency::Eur);

        let output = exec(&mut store, &["pets"]).await.unwrap();
        assert!(output.contains("Miso (cat)"));

        let output = exec(&mut store, &["categories"]).await.unwrap();
        assert!(output.contains("* "));
        assert!(output.contains("Food"));

        let output = exec(&mut store, &["summary"]).await.unwrap();
        assert!(output.contains("1 pet(s), 1 expense(s), 0 budget(s)"));
        assert!(output.contains("spent: 19.99 EUR"));
        // Due 31 days out, one past the default window.
        assert!(!output.contains("2024-04-15  Miso"));

        let output = exec(&mut store, &["summary", "--horizon", "31"])
            .await
            .unwrap();
        assert!(output.contains("2024-04-15  Miso"));
    }

    #[tokio::test]
    async fn budgets_report_utilisation() {
        let mut store = store().await;
        exec(&mut store, &["add-pet", "--name", "Rex"]).await.unwrap();
        exec(&mut store, &["add-category", "--block", "veterinary"])
            .await
            .unwrap();
        let pet = store.pets()[0].id.to_string();
        let vet = store.categories()[0].id.to_string();

        let output = exec(
            &mut store,
            &[
                "add-budget", "--pet", &pet, "--category", &vet, "--amount", "100",
                "--start", "2024-03-01",
            ],
        )
        .await
        .unwrap();
        assert!(output.contains("2024-03-01 to 2024-03-31"));

        exec(
            &mut store,
            &["add-expense", "--pet", &pet, "--category", &vet, "--amount", "85"],
        )
        .await
        .unwrap();

        let output = exec(&mut store, &["budgets"]).await.unwrap();
        assert!(output.contains("Rex / Veterinary: 85.00 of 100.00 EUR (85%, warning)"));
    }

    #[tokio::test]
    async fn failed_deletes_surface_the_error_slot() {
        let mut store = store().await;
        let missing = Uuid::new_v4().to_string();

        let result = exec(&mut store, &["remove-pet", &missing]).await;

        assert!(matches!(result, Err(AppError::Action(message)) if message.contains("not found")));
    }

    #[tokio::test]
    async fn blocks_list_the_catalog() {
        let mut store = store().await;

        let output = exec(&mut store, &["blocks"]).await.unwrap();

        assert_eq!(output.lines().count(), store.catalog().blocks().len());
        assert!(output.contains("Food (default)"));
        assert!(output.contains("Toys"));
        assert!(!output.contains("Toys (default)"));
    }

    #[tokio::test]
    async fn settings_change_the_default_currency() {
        let mut store = store().await;

        let output = exec(&mut store, &["settings", "--default-currency", "gbp"])
            .await
            .unwrap();

        assert!(output.contains("default currency: GBP"));
        assert_eq!(default_currency(&store), Currency::Gbp);
    }
}
