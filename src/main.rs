use cheney_core::HeapConfig;
use cheney_gc::{ChunkRef, GcError, GcStatistics, Heap};
use clap::{Parser, ValueEnum};
use eyre::{bail, Result, WrapErr};
use tracing::{info, Level};

/// Runs small mutator programs against a semi-space heap and dumps it between steps.
#[derive(Parser)]
#[command(about)]
struct Args {
	/// Chunk slots in each semi-space. Overrides CHENEY_SPACE_CAPACITY.
	#[arg(long)]
	space_capacity: Option<usize>,

	/// Maximum number of roots. Overrides CHENEY_ROOT_CAPACITY.
	#[arg(long)]
	root_capacity: Option<usize>,

	/// Log every allocation, root push and collection phase
	#[arg(short, long, default_value_t = false)]
	verbose: bool,

	#[arg(value_enum, default_value_t = Scenario::SelfLoop)]
	scenario: Scenario,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Scenario {
	/// c1 -> c2, c2 -> c2, root c1, collect
	SelfLoop,
	/// c1 -> c2 rooted, c3 unreachable, collect
	Garbage,
	/// Push roots until the root set refuses
	RootOverflow,
	/// Allocate until the heap refuses, then collect and retry
	Exhaust,
	/// Ten rooted two-chunk lists, collected twice
	Pairs,
	/// Ten thousand collections in a row
	Churn,
	All,
}

const CHURN_ROUNDS: usize = 10_000;

fn main() -> Result<()> {
	let args = Args::parse();
	cheney_core::init_with(
		Level::INFO,
		if args.verbose { Level::TRACE } else { Level::INFO },
	);

	let config = config(&args)?;
	info!(
		"Heap of {} chunks per space, {} roots",
		config.space_capacity, config.root_capacity
	);

	match args.scenario {
		Scenario::SelfLoop => self_loop(config),
		Scenario::Garbage => garbage(config),
		Scenario::RootOverflow => root_overflow(config),
		Scenario::Exhaust => exhaust(config),
		Scenario::Pairs => pairs(config),
		Scenario::Churn => churn(config),
		Scenario::All => {
			self_loop(config)?;
			garbage(config)?;
			root_overflow(config)?;
			exhaust(config)?;
			pairs(config)?;
			churn(config)
		}
	}
}

fn config(args: &Args) -> Result<HeapConfig> {
	let mut config = HeapConfig::from_env().wrap_err("invalid heap configuration in environment")?;
	if let Some(space_capacity) = args.space_capacity {
		config = config.with_space_capacity(space_capacity)?;
	}
	if let Some(root_capacity) = args.root_capacity {
		config = config.with_root_capacity(root_capacity)?;
	}
	Ok(config)
}

fn report(statistics: GcStatistics) {
	println!(
		"Copied roots = {}, copied blocks = {}, cleared = {}",
		statistics.roots_copied, statistics.chunks_copied, statistics.chunks_cleared
	);
}

fn self_loop(config: HeapConfig) -> Result<()> {
	info!("Scenario: self-loop");
	let mut heap = Heap::new(config);
	let c1 = heap.allocate()?;
	let c2 = heap.allocate()?;
	heap.set_reference(c1, c2)?;
	heap.set_reference(c2, c2)?;
	heap.push(c1)?;
	println!("{}", heap.dump());

	report(heap.collect());
	println!("{}", heap.dump());
	Ok(())
}

fn garbage(config: HeapConfig) -> Result<()> {
	info!("Scenario: garbage");
	let mut heap = Heap::new(config);
	let c1 = heap.allocate()?;
	let c2 = heap.allocate()?;
	let c3 = heap.allocate()?;
	heap.set_reference(c1, c2)?;
	heap.set_scalar(c2, 2)?;
	heap.set_scalar(c3, 3)?;
	heap.push(c1)?;
	println!("{}", heap.dump());

	let statistics = heap.collect();
	report(statistics);
	println!("{}", heap.dump());
	if statistics.chunks_cleared != 1 {
		bail!("expected c3 to be cleared, {statistics:?}");
	}
	Ok(())
}

fn root_overflow(config: HeapConfig) -> Result<()> {
	info!("Scenario: root-overflow");
	let mut heap = Heap::new(config);
	let chunk = heap.allocate()?;

	loop {
		match heap.push(chunk) {
			Ok(()) => {}
			Err(error @ GcError::StackOverflow { .. }) => {
				println!("push {} refused: {error}", heap.roots().len() + 1);
				break;
			}
			Err(error) => return Err(error.into()),
		}
	}

	if heap.roots().len() != config.root_capacity {
		bail!(
			"root set holds {} entries after overflowing, expected {}",
			heap.roots().len(),
			config.root_capacity
		);
	}

	report(heap.collect());
	println!("{}", heap.dump());
	Ok(())
}

fn exhaust(config: HeapConfig) -> Result<()> {
	info!("Scenario: exhaust");
	let mut heap = Heap::new(config);
	let kept = heap.allocate()?;
	heap.set_scalar(kept, 7)?;
	heap.push(kept)?;

	let error = loop {
		match heap.allocate() {
			Ok(_) => {}
			Err(error) => break error,
		}
	};
	println!("allocation {} refused: {error}", heap.live_count() + 1);
	if !matches!(error, GcError::HeapExhausted { .. }) {
		return Err(error.into());
	}

	report(heap.collect());
	let retried = heap
		.allocate()
		.wrap_err("allocation still failing after a collection")?;
	heap.set_scalar(retried, 8)?;
	println!(
		"retried allocation got {retried}, {} chunk(s) live in the {} space",
		heap.live_count(),
		heap.active()
	);
	Ok(())
}

fn pairs(config: HeapConfig) -> Result<()> {
	info!("Scenario: pairs");
	let mut heap = Heap::new(config);
	for index in 0..10 {
		let head = heap.allocate()?;
		let tail = heap.allocate()?;
		heap.set_reference(head, tail)?;
		heap.set_scalar(tail, index)?;
		heap.push(head)?;
	}
	println!("{}", heap.dump());

	report(heap.collect());
	println!("{}", heap.dump());
	report(heap.collect());
	println!("{}", heap.dump());

	check_pairs(&heap)
}

fn check_pairs(heap: &Heap) -> Result<()> {
	for (index, head) in heap.roots().iter().enumerate() {
		let tail = tail_of(heap, head)?;
		if heap.payload(tail)?.as_scalar() != Some(index as u32) {
			bail!("pair {index} lost its value");
		}
	}
	Ok(())
}

fn tail_of(heap: &Heap, head: ChunkRef) -> Result<ChunkRef> {
	match heap.payload(head)?.as_reference() {
		Some(tail) => Ok(tail),
		None => bail!("{head} no longer points at its tail"),
	}
}

fn churn(config: HeapConfig) -> Result<()> {
	info!("Scenario: churn");
	let mut heap = Heap::new(config);
	for index in 0..10 {
		let head = heap.allocate()?;
		let tail = heap.allocate()?;
		heap.set_reference(head, tail)?;
		heap.set_scalar(tail, index)?;
		heap.push(head)?;
	}

	let live = heap.live_count();
	for round in 0..CHURN_ROUNDS {
		let statistics = heap.collect();
		if statistics.chunks_remaining != live {
			bail!(
				"round {round}: live set changed from {live} to {}",
				statistics.chunks_remaining
			);
		}
	}

	println!(
		"{} collections, {} chunks live in the {} space",
		heap.collections(),
		heap.live_count(),
		heap.active()
	);
	check_pairs(&heap)
}
