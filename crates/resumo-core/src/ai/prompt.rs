//! Prompts sent with the PDF.
//!
//! Both ask for the six columns of the "RESUMO FINAL" block in order and for
//! the two origin counts. The JSON keys and count line names are parsed back
//! by `summary::orchestrator` and `summary::rules::origins`.

pub const JSON_PROMPT: &str = r#"Aja como um extrator de dados altamente preciso.
Localize o bloco 'RESUMO FINAL' no PDF.
Para cada produto no bloco, extraia exatamente nesta ordem:
1. Descrição (nome do produto)
2. Referência (ex: CX-24, UN-1)
3. Caixa/Unid (quantidade)
4. Valor Total (monetário)
5. Preço Médio (monetário)
6. Un Volume (valor decimal)

Também extraia as contagens de origens:
- sfa_count: ocorrências de "Origem: R = SFA via portal"
- heishop_count: ocorrências de "Origem: G = Pedido Heishop (B2B)"

Mantenha os números exatamente como aparecem no documento (ex: 1.167,38).
Formate a resposta como JSON estrito, sem texto adicional:
{
  "products": [
    {
      "descricao": "...",
      "referencia": "...",
      "caixa_unid": "...",
      "valor_total": "...",
      "preco_medio": "...",
      "un_volume": "..."
    }
  ],
  "sfa_count": 0,
  "heishop_count": 0
}"#;

pub const DELIMITED_PROMPT: &str = r#"Aja como um extrator de dados altamente preciso.
Localize o bloco 'RESUMO FINAL' no PDF.
Escreva a linha [TABLE_START], depois uma linha por produto com as colunas
separadas por espaços, exatamente nesta ordem:
Descrição  Referência  Caixa/Unid  Valor Total  Preço Médio  Un Volume
e então a linha [TABLE_END].

Mantenha os números exatamente como aparecem no documento (ex: 1.167,38).
Não escreva cabeçalhos nem totais dentro do bloco.

Depois do bloco, escreva as contagens de origens, uma por linha:
SFA_COUNT: <ocorrências de "Origem: R = SFA via portal">
HEISHOP_COUNT: <ocorrências de "Origem: G = Pedido Heishop (B2B)">"#;
