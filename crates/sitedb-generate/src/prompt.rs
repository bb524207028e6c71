use sitedb_core::types::CollectionKind;

/// Full prompt for one agent call: role, the user's query, the retrieved
/// records, and the instruction to admit when the records do not answer it.
pub fn render(kind: CollectionKind, company: &str, query: &str, records: &str) -> String {
    let (agent, role, noun, data_label) = match kind {
        CollectionKind::Projects => (
            "Projects Agent",
            format!("provide accurate information about {company}'s past construction projects"),
            "projects",
            "PROJECT DATA",
        ),
        CollectionKind::Awards => (
            "Awards Agent",
            format!("provide accurate information about awards and recognition received by {company}"),
            "awards",
            "AWARD DATA",
        ),
    };
    format!(
        "You are the {agent} for {company}. Your role is to {role}.\n\n\
         USER QUERY: {query}\n\n\
         {data_label}:\n{records}\n\n\
         Based on the information provided, respond to the user's query about {company}'s {noun}.\n\
         Present the information in a clear, concise, and helpful manner.\n\
         If the provided data doesn't contain relevant information to answer the query,\n\
         say that you don't have that specific information about {company}'s {noun}.\n\n\
         RESPONSE:"
    )
}
