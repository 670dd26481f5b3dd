use mavgraph::dependency_resolver::*;

fn main() {
	env_logger::init();

	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",       "Show help");
		opts.optopt(  "c", "catalog",    "JSON metadata catalog to resolve against", "FILE");
		opts.optopt(  "s", "scope",      "Scope closure: compile, runtime, compile+runtime, runtime+system or test", "SCOPE");
		opts.optflag( "o", "optional",   "Expand optional dependencies of transitive artifacts");
		opts.optmulti("m", "managed",    "Pin a transitive dependency version", "GROUP:ARTIFACT=VERSION");
		opts.optopt(  "d", "max-depth",  "Don't expand nodes at or beyond this depth", "DEPTH");
		opts.optflag( "j", "json",       "Print the graph as JSON instead of a listing");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return }
		};

		if parsed_options.opt_present("h") || parsed_options.free.is_empty() {
			eprintln!("{}", opts.usage("Usage: mavgraph -c CATALOG [options] GROUP:ARTIFACT:VERSION"));
			return;
		}

		parsed_options
	};

	match run(&parsed_options) {
		Ok(_) => {},
		Err(e) => {
			log::error!("{}", e);
			std::process::exit(1);
		},
	}
}

fn run(parsed_options: &getopts::Matches) -> Result<(), Error> {
	let catalog_path = parsed_options.opt_str("c").ok_or(Error::MissingArgument("--catalog"))?;
	let catalog = mavgraph::metadata::Catalog::from_json(&std::fs::read_to_string(&catalog_path)?)?;

	let root: mavgraph::Coordinate = parsed_options.free[0].parse()?;

	let mut builder = ResolverBuilder::new()
		.metadata_provider(&catalog)
		.root(root)
		.include_optional(parsed_options.opt_present("o"));

	if let Some(scope) = parsed_options.opt_str("s") {
		builder = builder.desired_scope(scope.parse()?);
	}
	if let Some(depth) = parsed_options.opt_str("d") {
		builder = builder.max_depth(depth.parse::<usize>().map_err(|_| Error::InvalidArgument(depth))?);
	}
	for managed in parsed_options.opt_strs("m") {
		let (key, version) = managed.split_once('=').ok_or_else(|| Error::InvalidArgument(managed.clone()))?;
		builder = builder.managed_version(key.parse()?, version);
	}

	let graph = builder.build()?.resolve()?;

	if parsed_options.opt_present("j") {
		println!("{}", serde_json::to_string_pretty(&graph)?);
	} else {
		print_listing(&graph);
	}

	Ok(())
}

fn print_listing(graph: &DependencyGraph) {
	println!("Resolved artifacts:");
	for artifact in graph.resolved_artifacts() {
		match artifact.scope {
			Some(scope) => println!("\t{}{} ({})", "  ".repeat(artifact.depth), artifact.coordinate, scope),
			None => println!("\t{}", artifact.coordinate),
		}
	}

	let disabled: Vec<_> = graph.edges().filter(|e| !e.is_enabled()).collect();
	if !disabled.is_empty() {
		println!("Disabled edges:");
		for edge in disabled {
			if let Some(d) = &edge.disabled {
				println!("\t{} -> {} [{}] {}", edge.from, edge.to, d.kind, d.reason);
			}
		}
	}

	let conflicted: Vec<_> = graph.nodes().filter(|n| n.conflicted).collect();
	if !conflicted.is_empty() {
		println!("Conflicted:");
		for node in conflicted {
			println!("\t{}", node.coordinate);
		}
	}

	let orphans = graph.orphans();
	if !orphans.is_empty() {
		println!("Orphans:");
		for node in orphans {
			println!("\t{}", node.coordinate);
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("mavgraph error: {0}")]
	Mavgraph(#[from] mavgraph::Error),
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("missing argument {0}")]
	MissingArgument(&'static str),
	#[error("invalid argument `{0}`")]
	InvalidArgument(String),
}
