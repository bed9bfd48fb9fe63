use crate::buildfile::{BuildFile, LoadError, TargetFailure};
use pkgmeta_schema::catalog::DEPENDENCIES;
use pkgmeta_schema::{
    BuilderConfig, ContentDeclaration, ContentEntity, CopiedFields, PackageDescriptor, RawFields,
    Value,
};
use tracing::{debug, info, warn};

/// One assembled package and the builder config rendered for it.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageOutput {
    pub descriptor: PackageDescriptor,
    pub config: BuilderConfig,
}

/// Everything a build file produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub packages: Vec<PackageOutput>,
    pub entities: Vec<ContentEntity>,
}

impl Evaluation {
    pub fn package(&self, name: &str) -> Option<&PackageOutput> {
        self.packages
            .iter()
            .find(|p| p.descriptor.address().rsplit_once(':').map(|(_, n)| n) == Some(name))
    }
}

impl BuildFile {
    /// Expand every content target and assemble every package.
    ///
    /// A failing target does not stop the others; all failures are returned
    /// together in [`LoadError::Invalid`].
    pub fn evaluate(&self) -> Result<Evaluation, LoadError> {
        let mut failures = Vec::new();
        let mut entities = Vec::new();

        for target in self.contents() {
            let address = self.address(&target.name);
            let declaration = ContentDeclaration::new(
                address.clone(),
                target.kind.content_kind(),
                target.entries.clone(),
            )
            .with_copied(CopiedFields {
                description: target.description.clone(),
                tags: target.tags.clone(),
            });
            match declaration.expand() {
                Ok(expanded) => entities.extend(expanded),
                Err(errors) => {
                    warn!("content target {address} is invalid ({} errors)", errors.len());
                    failures.push(TargetFailure { address, errors });
                }
            }
        }

        let mut descriptors = Vec::new();
        for (format, target) in self.packages() {
            let address = self.address(&target.name);
            let fields = self.qualify_dependencies(&target.fields);
            match PackageDescriptor::assemble(format, &address, &fields) {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(errors) => {
                    warn!("package target {address} is invalid ({} errors)", errors.len());
                    failures.push(TargetFailure { address, errors });
                }
            }
        }

        if !failures.is_empty() {
            return Err(LoadError::Invalid(failures));
        }

        let packages: Vec<PackageOutput> = descriptors
            .into_iter()
            .map(|descriptor| {
                let config = BuilderConfig::render(&descriptor, &entities);
                debug!("rendered builder config for {}", descriptor.address());
                PackageOutput { descriptor, config }
            })
            .collect();
        info!(
            "evaluated {}: {} packages, {} content entities",
            self.dir(),
            packages.len(),
            entities.len()
        );
        Ok(Evaluation { packages, entities })
    }

    fn qualify_dependencies(&self, fields: &RawFields) -> RawFields {
        let mut fields = fields.clone();
        if let Some(Value::List(deps)) = fields.get_mut(DEPENDENCIES.name) {
            for dep in deps.iter_mut() {
                *dep = self.qualify(dep);
            }
        }
        fields
    }
}
