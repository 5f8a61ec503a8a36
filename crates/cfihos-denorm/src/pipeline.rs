//! One full run over one configuration.

use anyhow::{Context, Result};

use cfihos_ingest::{MappingContext, SheetReader, SourceLoader};
use cfihos_model::ModelEntities;

use crate::builder::ModelBuilder;
use crate::collect::{self, ProcessOptions, ProcessedTables};
use crate::config::ProcessorConfig;
use crate::partition::PropertyPartitioner;

/// Everything a run produced, kept for callers that need more than the model.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub entities: ModelEntities,
    pub tables: ProcessedTables,
    pub context: MappingContext,
}

pub struct Pipeline<'a> {
    config: &'a ProcessorConfig,
    reader: &'a dyn SheetReader,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ProcessorConfig, reader: &'a dyn SheetReader) -> Self {
        Self { config, reader }
    }

    pub fn run(&self) -> Result<PipelineOutput> {
        let model_type = self.config.model_type()?;

        tracing::info!("Step 1: setting up model processors");
        let loaders = self.setup()?;
        let groupings: Vec<String> = loaders.iter().flat_map(|l| l.groupings()).collect();
        let context = self.synchronize(&loaders);

        tracing::info!("Step 2: collecting processor data");
        let mut outputs = Vec::with_capacity(loaders.len());
        for loader in &loaders {
            let tables = loader
                .process(self.reader, &context)
                .with_context(|| format!("processing '{}'", loader.name()))?;
            outputs.push((loader.name().to_string(), tables));
        }
        let collected = collect::collect(outputs);

        tracing::info!("Step 3: validating collected data");
        collect::validate(&collected)?;

        tracing::info!("Step 4: processing collected data");
        let options = ProcessOptions {
            root_nodes: self.config.root_nodes_list.clone(),
            scalar_relation_companions: self.config.add_scalar_properties_for_direct_relations,
        };
        let tables = collect::process(collected, &options)?;

        tracing::info!(?model_type, "Step 5: building model structures");
        let partitioner = PropertyPartitioner::new(groupings, self.config.container_property_limit);
        let entities = ModelBuilder::new(model_type, &partitioner, &context).build(&tables)?;

        Ok(PipelineOutput {
            entities,
            tables,
            context,
        })
    }

    fn setup(&self) -> Result<Vec<SourceLoader>> {
        self.config
            .processor_entries()
            .map(|(name, source)| {
                tracing::info!(processor = %name, "setting up");
                SourceLoader::new(name, source.clone(), self.reader)
            })
            .collect()
    }

    fn synchronize(&self, loaders: &[SourceLoader]) -> MappingContext {
        let order = self.config.merge_order();
        MappingContext::synchronize(order.iter().filter_map(|name| {
            loaders
                .iter()
                .find(|l| l.name() == name)
                .map(|l| (l.name(), l.mapping_tables()))
        }))
    }
}
