/// fill the fixed generation template with a question and a schema listing
pub fn build_sql_prompt(question: &str, schema: &str) -> String {
    format!(
        "\n### Task\n\
         Generate a SQL query to answer [QUESTION]{question}[/QUESTION]\n\
         \n\
         ### Database Schema\n\
         The query will run on a database with the following schema:\n\
         {schema}\n\
         \n\
         ### Answer\n\
         Given the database schema, here is the SQL query that [QUESTION]{question}[/QUESTION]\n\
         [SQL]\n\
         \n",
        question = question,
        schema = schema,
    )
}
