use crate::error::{NavigationError, SchemaError};
use crate::screen::{DefinitionsDocument, FlowDocument, Screen};
use ahash::AHashMap;
use itertools::Itertools;
use std::fs;
use tracing::debug;

/// Name of the screen every flow starts from.
pub const INITIAL_SCREEN: &str = "initial_screen";

/// A named, ordered collection of compiled screens.
#[derive(Debug, Clone)]
pub struct Flow {
    name: String,
    screens: Vec<Screen>,
    index: AHashMap<String, usize>,
    initial: usize,
}

impl Flow {
    fn compile(name: String, document: FlowDocument) -> Result<Self, SchemaError> {
        let mut screens = Vec::with_capacity(document.screens.len());
        let mut index = AHashMap::with_capacity(document.screens.len());

        for definition in document.screens {
            let screen = Screen::compile(definition)?;
            if index.insert(screen.name.clone(), screens.len()).is_some() {
                return Err(SchemaError::DuplicateScreen {
                    flow: name,
                    screen: screen.name,
                });
            }
            screens.push(screen);
        }

        let Some(&initial) = index.get(INITIAL_SCREEN) else {
            return Err(SchemaError::MissingInitialScreen { flow: name });
        };

        Ok(Self {
            name,
            screens,
            index,
            initial,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Screens in document order.
    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn screen(&self, name: &str) -> Result<&Screen, NavigationError> {
        self.index
            .get(name)
            .map(|&position| &self.screens[position])
            .ok_or_else(|| NavigationError::ScreenNotFound {
                flow: self.name.clone(),
                screen: name.to_string(),
            })
    }

    pub fn initial_screen(&self) -> &Screen {
        &self.screens[self.initial]
    }
}

/// Read-only store of every flow in a definitions document.
///
/// A store is immutable once built and can be shared across concurrent
/// requests behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct ScreenStore {
    flows: AHashMap<String, Flow>,
}

impl ScreenStore {
    pub fn from_document(document: DefinitionsDocument) -> Result<Self, SchemaError> {
        let flows = document
            .flows
            .into_iter()
            .map(|(name, flow)| Flow::compile(name.clone(), flow).map(|flow| (name, flow)))
            .collect::<Result<AHashMap<_, _>, _>>()?;

        debug!(
            flows = %flows.keys().sorted().join(", "),
            "Loaded screen definitions"
        );
        Ok(Self { flows })
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: DefinitionsDocument =
            serde_json::from_str(json).map_err(|e| SchemaError::DocumentParse(e.to_string()))?;
        Self::from_document(document)
    }

    pub fn from_file(path: &str) -> Result<Self, SchemaError> {
        let content = fs::read_to_string(path).map_err(|e| SchemaError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn flow(&self, name: &str) -> Result<&Flow, NavigationError> {
        self.flows
            .get(name)
            .ok_or_else(|| NavigationError::FlowNotFound(name.to_string()))
    }

    /// All flows, sorted by name.
    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows
            .values()
            .sorted_by(|a, b| a.name.cmp(&b.name))
    }
}
