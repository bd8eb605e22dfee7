use crate::domain::model::{ContractRecord, Party, Witness};
use crate::domain::ports::GenerationRequest;
use chrono::NaiveDate;
use std::fmt::Write;

pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Persona and layout rules for the generator. The renderer relies on the
/// `**TÍTULO**` heading convention asked for here.
pub const SYSTEM_INSTRUCTION: &str = "\
Você é um advogado sênior especialista em direito contratual e civil brasileiro.
Redija contratos de prestação de serviços com rigor técnico e linguagem clara.

REGRAS DE FORMATAÇÃO:
1. Não use tabelas em Markdown.
2. Títulos de seção em CAIXA ALTA e em negrito (ex.: **1. DO OBJETO**).
3. Destaque em negrito os dados variáveis (nomes, valores, prazos).
4. Evite quebras de linha no meio das frases.
5. Termine com a área de assinaturas.

ESTRUTURA:
- TÍTULO
- PREÂMBULO com a qualificação completa das partes (e-mail e endereço)
- CLÁUSULAS: objeto, obrigações, valor, prazo, rescisão, foro
- ASSINATURAS, incluindo testemunhas quando solicitado";

const BLANK_DATE: &str = "____/____/____";

fn format_short_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| BLANK_DATE.to_string())
}

fn write_party(out: &mut String, title: &str, party: &Party) {
    let c = &party.contact;
    let _ = writeln!(out, "{title}:");
    let _ = writeln!(out, "Nome/Razão Social: {}", c.name);
    let _ = writeln!(out, "CPF/CNPJ: {}", c.doc);
    if let Some(rg) = &party.rg {
        let _ = writeln!(out, "RG: {rg}");
    }
    let _ = writeln!(
        out,
        "Endereço: {}, CEP: {}, Cidade: {}/{}",
        c.address, c.cep, c.city, c.state
    );
    let _ = writeln!(out, "E-mail: {}", c.email);
    let _ = writeln!(out, "Telefone: {}", c.phone);
    if party.is_company() {
        let _ = writeln!(out, "(Pessoa Jurídica)");
    } else {
        let _ = writeln!(
            out,
            "Estado Civil: {}, Profissão: {}",
            party.civil_status, party.profession
        );
    }
    out.push('\n');
}

fn write_witness(out: &mut String, index: usize, witness: Option<&Witness>) {
    let empty = Witness::default();
    let w = witness.unwrap_or(&empty);
    let _ = writeln!(
        out,
        "{index}. Nome: {}, CPF: {}, E-mail: {}, Telefone: {}, Endereço: {}, CEP: {}, Cidade: {}/{}",
        w.name, w.doc, w.email, w.phone, w.address, w.cep, w.city, w.state
    );
}

/// Serializes the whole record into the user prompt, one labeled field per
/// line.
pub fn build_prompt(record: &ContractRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Elabore um CONTRATO DE PRESTAÇÃO DE SERVIÇOS DE {}.\n",
        record.service_type.label().to_uppercase()
    );
    out.push_str("QUALIFICAÇÃO DAS PARTES:\n\n");
    write_party(&mut out, "CONTRATANTE (Cliente)", &record.client);
    write_party(&mut out, "CONTRATADO (Prestador)", &record.provider);

    out.push_str("DADOS DO SERVIÇO:\n");
    let _ = writeln!(out, "OBJETO (Escopo): {}.", record.scope);
    let _ = writeln!(out, "VALOR TOTAL: R$ {}.", record.value);
    let _ = writeln!(
        out,
        "PRAZO/VIGÊNCIA: início em **{}** e término previsto para **{}**.\n",
        format_short_date(record.start_date),
        format_short_date(record.end_date)
    );

    if record.include_witnesses {
        out.push_str("TESTEMUNHAS (QUALIFICAÇÃO COMPLETA):\n");
        write_witness(&mut out, 1, record.witness1.as_ref());
        write_witness(&mut out, 2, record.witness2.as_ref());
        out.push_str(
            "Inclua a qualificação das testemunhas no contrato e os espaços para as suas assinaturas.\n\n",
        );
    } else {
        out.push_str(
            "Este contrato NÃO terá testemunhas. Gere apenas os espaços de assinatura do Contratante e do Contratado.\n\n",
        );
    }

    out.push_str(
        "Não gere a linha de local e data no final; ela é inserida automaticamente.\n\n",
    );
    out.push_str("CLÁUSULAS PADRÃO:\n");
    out.push_str("- Confidencialidade\n");
    out.push_str("- Inexistência de vínculo empregatício\n");
    out.push_str("- Multa por descumprimento\n");
    let _ = writeln!(
        out,
        "- Foro da comarca de {}/{}",
        record.provider.contact.city, record.provider.contact.state
    );
    out.push_str("\nRetorne o contrato completo pronto para impressão.\n");
    out
}

pub fn build_generation_request(record: &ContractRecord, temperature: f32) -> GenerationRequest {
    GenerationRequest {
        system_instruction: SYSTEM_INSTRUCTION.to_string(),
        prompt: build_prompt(record),
        temperature,
    }
}
