use super::*;

/// Collects everything a [`GraphResolver`] needs.
pub struct ResolverBuilder<'p> {
	provider: Option<&'p dyn MetadataProvider>,
	root: Option<Coordinate>,
	options: ResolverOptions,
	listeners: Vec<Box<dyn GraphListener>>,
}

impl<'p> ResolverBuilder<'p> {
	pub fn new() -> Self {
		Self {
			provider: None,
			root: None,
			options: Default::default(),
			listeners: Default::default(),
		}
	}

	pub fn metadata_provider(mut self, provider: &'p dyn MetadataProvider) -> Self {
		self.provider = Some(provider);
		self
	}

	pub fn root(mut self, root: Coordinate) -> Self {
		self.root = Some(root);
		self
	}

	pub fn options(mut self, options: ResolverOptions) -> Self {
		self.options = options;
		self
	}

	pub fn desired_scope(mut self, desired_scope: DesiredScope) -> Self {
		self.options.set_desired_scope(desired_scope);
		self
	}

	pub fn include_optional(mut self, include_optional: bool) -> Self {
		self.options.set_include_optional(include_optional);
		self
	}

	pub fn managed_version(mut self, key: ArtifactKey, version: impl Into<String>) -> Self {
		self.options.set_managed_version(key, version);
		self
	}

	pub fn max_depth(mut self, max_depth: usize) -> Self {
		self.options.set_max_depth(Some(max_depth));
		self
	}

	pub fn listener(mut self, listener: impl GraphListener + 'static) -> Self {
		self.listeners.push(Box::new(listener));
		self
	}

	/// # Errors
	/// [`Error::Configuration`] when the root or the metadata provider is missing, or the root is malformed.
	pub fn build(self) -> Result<GraphResolver<'p>> {
		let provider = self.provider.ok_or_else(|| Error::Configuration("no metadata provider given".to_string()))?;
		let root = self.root.ok_or_else(|| Error::Configuration("no root coordinate given".to_string()))?;
		if !root.is_valid() {
			return Err(Error::Configuration(format!("root coordinate `{}` is incomplete", root)));
		}

		let mut resolver = GraphResolver::new(provider, root, self.options);
		for listener in self.listeners {
			resolver.register_boxed_listener(listener);
		}
		Ok(resolver)
	}
}

impl<'p> Default for ResolverBuilder<'p> {
	fn default() -> Self {
		Self::new()
	}
}
