//! Prompt construction for the query and answer stages.

use crate::llm::ChatMessage;

/// Row cap the model is instructed to apply unless the question asks
/// for a specific number of examples.
pub const TOP_K: usize = 10;

const QUERY_SYSTEM_TEMPLATE: &str = "\
Given an input question, create a syntactically correct {dialect} query to
run to help find the answer. Unless the user specifies in his question a
specific number of examples they wish to obtain, always limit your query to
at most {top_k} results. You can order the results by a relevant column to
return the most interesting examples in the database.

Never query for all the columns from a specific table, only ask for a the
few relevant columns given the question.

Pay attention to use only the column names that you can see in the schema
description. Be careful to not query for columns that do not exist. Also,
pay attention to which column is in which table.

Only use the following tables:
{table_info}";

/// Build the messages for the SQL generation stage.
pub fn query_prompt(dialect: &str, table_info: &str, question: &str) -> Vec<ChatMessage> {
    let system = QUERY_SYSTEM_TEMPLATE
        .replace("{dialect}", dialect)
        .replace("{top_k}", &TOP_K.to_string())
        .replace("{table_info}", table_info);

    vec![
        ChatMessage::system(system),
        ChatMessage::user(format!("Question: {question}")),
    ]
}

/// Build the message for the answer stage, quoting the executed query
/// and its rows back to the model.
pub fn answer_prompt(question: &str, query: &str, result: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(format!(
        "Given the following user question, corresponding SQL query, \
         and SQL result, answer the user question.\n\n\
         Question: {question}\n\
         SQL Query: {query}\n\
         SQL Result: {result}"
    ))]
}
