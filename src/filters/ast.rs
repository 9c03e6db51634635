/// Index entry fields a filter can test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    /// Project name (exact, case-insensitive) or part of the project path
    Project,
    /// Any tag, case-insensitive
    Tag,
    /// `manual` or `auto`
    Source,
    /// Saved on or after a day (YYYY-MM-DD, UTC)
    Since,
    /// Saved on or before a day (YYYY-MM-DD, UTC)
    Until,
}

impl FilterField {
    pub fn name(self) -> &'static str {
        match self {
            FilterField::Project => "project",
            FilterField::Tag => "tag",
            FilterField::Source => "source",
            FilterField::Since => "since",
            FilterField::Until => "until",
        }
    }
}

/// Logical operators for combining filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Both conditions must match (default between different fields)
    And,
    /// Either condition matches (default within same field)
    Or,
}

/// Single field:value filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: FilterField,
    pub value: String,
}

impl FieldFilter {
    pub fn new(field: FilterField, value: impl Into<String>) -> Self {
        Self { field, value: value.into() }
    }
}

/// Filters joined by operators, evaluated left to right without precedence
///
/// `operators[i]` joins the running result with `filters[i + 1]`, so a well-formed
/// expression always has one operator fewer than it has filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpr {
    pub filters: Vec<FieldFilter>,
    pub operators: Vec<FilterOperator>,
}

impl FilterExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_filter(&mut self, filter: FieldFilter) {
        self.filters.push(filter);
    }

    pub fn add_operator(&mut self, operator: FilterOperator) {
        self.operators.push(operator);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
