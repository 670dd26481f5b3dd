use serde::{Serialize, Deserialize};

/// How a dependency is used, controls whether and how it propagates to dependents.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
	#[default] Compile,
	Runtime,
	Test,
	Provided,
	System,
}

impl Scope {
	pub const ALL: [Scope; 5] = [Scope::Compile, Scope::Runtime, Scope::Test, Scope::Provided, Scope::System];

	/// Effective scope of a dependency declared with `declared` by a node that was itself reached with scope `self`.
	///
	/// `None` when the dependency does not propagate at all.
	/// `test`, `provided` and `system` dependencies are never transitive.
	pub fn combine(self, declared: Scope) -> Option<Scope> {
		match (self, declared) {
			(Scope::System, _) => None,
			(_, Scope::Test | Scope::Provided | Scope::System) => None,

			(Scope::Compile, Scope::Compile) => Some(Scope::Compile),
			(Scope::Compile, Scope::Runtime) => Some(Scope::Runtime),
			(Scope::Runtime, Scope::Compile | Scope::Runtime) => Some(Scope::Runtime),
			(Scope::Provided, Scope::Compile | Scope::Runtime) => Some(Scope::Provided),
			(Scope::Test, Scope::Compile | Scope::Runtime) => Some(Scope::Test),
		}
	}

	/// Effective scope of a candidate given the scope of the edge leading to its declaring node.
	///
	/// Direct dependencies of the root (`incoming` is `None`) keep their declared scope.
	pub fn effective(incoming: Option<Scope>, declared: Scope) -> Option<Scope> {
		match incoming {
			None => Some(declared),
			Some(incoming) => incoming.combine(declared),
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Scope::Compile => "compile",
			Scope::Runtime => "runtime",
			Scope::Test => "test",
			Scope::Provided => "provided",
			Scope::System => "system",
		}
	}
}

impl std::str::FromStr for Scope {
	type Err = crate::Error;

	fn from_str(s: &str) -> crate::Result<Self> {
		Scope::ALL.into_iter()
			.find(|scope| scope.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| crate::Error::Parse(format!("unknown scope `{}`", s)))
	}
}

impl std::fmt::Display for Scope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// What the resolution is for. Each choice expands to a closure of acceptable effective scopes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DesiredScope {
	/// `compile`, `provided` and `system`.
	Compile,
	/// `compile` and `runtime`.
	Runtime,
	/// `compile`, `provided`, `system` and `runtime`.
	CompileRuntime,
	/// `compile`, `runtime` and `system`.
	RuntimeSystem,
	/// Everything.
	#[default] Test,
}

impl DesiredScope {
	pub fn closure(&self) -> &'static [Scope] {
		match self {
			DesiredScope::Compile => &[Scope::Compile, Scope::Provided, Scope::System],
			DesiredScope::Runtime => &[Scope::Compile, Scope::Runtime],
			DesiredScope::CompileRuntime => &[Scope::Compile, Scope::Provided, Scope::System, Scope::Runtime],
			DesiredScope::RuntimeSystem => &[Scope::Compile, Scope::Runtime, Scope::System],
			DesiredScope::Test => &Scope::ALL,
		}
	}

	pub fn accepts(&self, scope: Scope) -> bool {
		self.closure().contains(&scope)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			DesiredScope::Compile => "compile",
			DesiredScope::Runtime => "runtime",
			DesiredScope::CompileRuntime => "compile+runtime",
			DesiredScope::RuntimeSystem => "runtime+system",
			DesiredScope::Test => "test",
		}
	}
}

impl std::str::FromStr for DesiredScope {
	type Err = crate::Error;

	fn from_str(s: &str) -> crate::Result<Self> {
		[DesiredScope::Compile, DesiredScope::Runtime, DesiredScope::CompileRuntime, DesiredScope::RuntimeSystem, DesiredScope::Test]
			.into_iter()
			.find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| crate::Error::Parse(format!("unknown scope closure `{}`", s)))
	}
}

impl std::fmt::Display for DesiredScope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test] fn scope_compile_through_compile_is_compile() { assert_eq!(Scope::Compile.combine(Scope::Compile), Some(Scope::Compile)) }
	#[test] fn scope_runtime_through_compile_is_runtime() { assert_eq!(Scope::Compile.combine(Scope::Runtime), Some(Scope::Runtime)) }
	#[test] fn scope_compile_through_test_is_test() { assert_eq!(Scope::Test.combine(Scope::Compile), Some(Scope::Test)) }
	#[test] fn scope_compile_through_provided_is_provided() { assert_eq!(Scope::Provided.combine(Scope::Compile), Some(Scope::Provided)) }
	#[test] fn scope_test_is_never_transitive() { assert_eq!(Scope::Compile.combine(Scope::Test), None) }
	#[test] fn scope_provided_is_never_transitive() { assert_eq!(Scope::Compile.combine(Scope::Provided), None) }
	#[test] fn scope_system_is_never_transitive() { assert_eq!(Scope::Runtime.combine(Scope::System), None) }
	#[test] fn scope_system_declares_nothing_transitive() { assert_eq!(Scope::System.combine(Scope::Compile), None) }
	#[test] fn scope_root_keeps_declared() { assert_eq!(Scope::effective(None, Scope::Test), Some(Scope::Test)) }
	#[test] fn scope_parse_is_case_insensitive() { assert_eq!("Runtime".parse::<Scope>().unwrap(), Scope::Runtime) }
	#[test] fn scope_parse_rejects_unknown() { assert!("import".parse::<Scope>().is_err()) }

	#[test] fn desired_compile_excludes_runtime() { assert!(!DesiredScope::Compile.accepts(Scope::Runtime)) }
	#[test] fn desired_runtime_excludes_provided() { assert!(!DesiredScope::Runtime.accepts(Scope::Provided)) }
	#[test] fn desired_test_accepts_everything() { assert!(Scope::ALL.iter().all(|s| DesiredScope::Test.accepts(*s))) }
	#[test] fn desired_parse_combined() { assert_eq!("compile+runtime".parse::<DesiredScope>().unwrap(), DesiredScope::CompileRuntime) }
}
