use soulcalc::config::Config;
use soulcalc::{logging, ui};
use soulcalc::{Calculator, Evaluator, FileStore, History, MemoryStore, Session};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let logging = logging::init(&config)?;

    let evaluator = Evaluator::new(config.priority);
    if logging {
        info!(priority = %evaluator.order(), persist = config.persist_history, "starting");
    }
    let calculator = Calculator::new(evaluator);

    // One run is one session unless persistence is switched on
    if config.persist_history {
        let store = FileStore::open(&config.history_file)?;
        info!(path = %store.path().display(), "using persistent history");
        ui::run_loop(&mut Session::new(calculator, History::new(store)))
    } else {
        ui::run_loop(&mut Session::new(calculator, History::new(MemoryStore::new())))
    }
}
