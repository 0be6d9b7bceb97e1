//! Commands and queries accepted by the catalogue.

use mediator::{Request, Validate, VoidRequest};

use super::{WidgetId, WidgetView, check_name};

/// Adds a widget. Responds with the new widget's id.
#[derive(Debug, Clone)]
pub struct CreateWidget {
    pub name: String,
}

impl CreateWidget {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Request for CreateWidget {
    type Response = WidgetId;

    fn request_name() -> &'static str {
        "CreateWidget"
    }
}

impl Validate for CreateWidget {
    fn validate(&self) -> Result<(), Vec<String>> {
        check_name(&self.name).map_err(|e| vec![e])
    }
}

/// Changes a widget's name.
#[derive(Debug, Clone)]
pub struct RenameWidget {
    pub id: WidgetId,
    pub name: String,
}

impl VoidRequest for RenameWidget {
    fn request_name() -> &'static str {
        "RenameWidget"
    }
}

impl Validate for RenameWidget {
    fn validate(&self) -> Result<(), Vec<String>> {
        check_name(&self.name).map_err(|e| vec![e])
    }
}

/// Removes a widget.
#[derive(Debug, Clone, Copy)]
pub struct DeleteWidget {
    pub id: WidgetId,
}

impl VoidRequest for DeleteWidget {
    fn request_name() -> &'static str {
        "DeleteWidget"
    }
}

/// Looks up one live widget.
#[derive(Debug, Clone, Copy)]
pub struct GetWidget {
    pub id: WidgetId,
}

impl Request for GetWidget {
    type Response = Option<WidgetView>;

    fn request_name() -> &'static str {
        "GetWidget"
    }
}

/// Lists live widgets, oldest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListWidgets;

impl Request for ListWidgets {
    type Response = Vec<WidgetView>;

    fn request_name() -> &'static str {
        "ListWidgets"
    }
}
