//! Per-collection field tables for the lexical scoring stages.

use sitedb_core::types::{CollectionKind, Field};

/// Fields scanned for keyword matches during hybrid merge, with match weights.
pub fn keyword_fields(kind: CollectionKind) -> &'static [(Field, u32)] {
    match kind {
        CollectionKind::Projects => &[
            (Field::Title, 3),
            (Field::Location, 2),
            (Field::Client, 2),
            (Field::Description, 1),
            (Field::Overview, 1),
            (Field::Features, 1),
            (Field::Specialties, 1),
        ],
        CollectionKind::Awards => &[
            (Field::Title, 3),
            (Field::Organization, 2),
            (Field::Location, 2),
            (Field::Category, 1),
            (Field::AwardType, 1),
            (Field::Description, 1),
            (Field::Date, 1),
            (Field::Year, 1),
            (Field::RelatedProjects, 1),
        ],
    }
}

/// Fields counted into the collection's term-frequency table.
pub fn frequency_fields(kind: CollectionKind) -> &'static [Field] {
    match kind {
        CollectionKind::Projects => &[Field::Title, Field::Description, Field::Overview, Field::Client, Field::Specialties],
        CollectionKind::Awards => &[Field::Title, Field::Description, Field::Organization, Field::Category],
    }
}

/// Fields and weights for the re-ranker's exact term presence boost.
pub fn rerank_fields(kind: CollectionKind) -> &'static [(Field, f32)] {
    match kind {
        CollectionKind::Projects => &[
            (Field::Title, 3.0),
            (Field::Location, 2.0),
            (Field::Client, 1.5),
            (Field::Features, 1.2),
            (Field::Specialties, 1.2),
            (Field::Value, 1.0),
            (Field::ConstructionValue, 1.0),
            (Field::DeliveryMethod, 0.8),
            (Field::Description, 1.0),
        ],
        CollectionKind::Awards => &[
            (Field::Title, 3.0),
            (Field::Organization, 2.5),
            (Field::Category, 2.0),
            (Field::Date, 1.5),
            (Field::Year, 1.5),
            (Field::Description, 1.0),
        ],
    }
}
