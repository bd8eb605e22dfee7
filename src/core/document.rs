use crate::core::renderer::{escape_html, render_html, BLOCK_CSS};
use crate::domain::model::{ContractRecord, PartyRole, Witness};
use crate::domain::ports::{ExportOptions, Orientation, PageFormat};

pub const DOCUMENT_TITLE: &str = "Contrato de Prestação de Serviços";
pub const DOCUMENT_SUBTITLE: &str = "Instrumento Particular Jurídico";
pub const CLOSING_FORMULA: &str = "E, por estarem assim justos e contratados, assinam o presente \
instrumento em 02 (duas) vias de igual teor e forma.";
const FOOTER_LEFT: &str = "Documento gerado eletronicamente";
const FOOTER_RIGHT: &str = "Página 1 de 1";

const PAGE_CSS: &str = "\
body { font-family: Georgia, 'Times New Roman', serif; font-size: 12pt; color: #0f172a; }
#printable-contract { max-width: 210mm; margin: 0 auto; padding: 20mm; }
.doc-header { border-bottom: 2px solid #1e293b; padding-bottom: 1.5rem; margin-bottom: 3rem; }
.doc-header h1 { text-transform: uppercase; letter-spacing: 0.2em; font-size: 1.5rem; margin: 0; }
.doc-header p { text-transform: uppercase; font-size: 0.75rem; color: #64748b; }
.signatures { margin-top: 6rem; page-break-inside: avoid; }
.place-date { text-align: center; font-weight: bold; margin-bottom: 2.5rem; }
.signature-grid { display: grid; grid-template-columns: 1fr 1fr; gap: 3rem; }
.signature { text-align: center; }
.signature img { height: 5rem; margin-bottom: -25px; object-fit: contain; }
.signature .line { border-top: 1px solid #1e293b; padding-top: 0.75rem; }
.signature .name { font-weight: bold; text-transform: uppercase; font-size: 0.875rem; }
.signature .role { font-size: 10px; text-transform: uppercase; color: #64748b; }
.witnesses { margin-top: 4rem; padding-top: 2rem; border-top: 1px solid #f1f5f9; }
.doc-footer { margin-top: 5rem; padding-top: 1.5rem; border-top: 1px solid #e2e8f0; display: flex; justify-content: space-between; font-size: 10px; text-transform: uppercase; color: #94a3b8; }
";

/// Maps characters that are not allowed in a file name to `_`, so a party
/// name can never point outside the output directory.
fn file_name_token(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `Contrato_<provider first name>_<client first name>.pdf`
pub fn export_filename(record: &ContractRecord) -> String {
    format!(
        "Contrato_{}_{}.pdf",
        file_name_token(record.provider.first_name()),
        file_name_token(record.client.first_name())
    )
}

pub fn default_export_options(record: &ContractRecord) -> ExportOptions {
    ExportOptions {
        filename: export_filename(record),
        margins_mm: [10, 10, 10, 10],
        image_quality: 0.98,
        scale: 2,
        page_format: PageFormat::A4,
        orientation: Orientation::Portrait,
    }
}

fn role_caption(role: PartyRole) -> &'static str {
    match role {
        PartyRole::Provider => "Contratado (Prestador)",
        PartyRole::Client => "Contratante (Cliente)",
    }
}

fn party_signature_html(record: &ContractRecord, role: PartyRole) -> String {
    let party = record.party(role);
    let image = record
        .signature(role)
        .map(|sig| {
            format!(
                "<img src=\"{}\" alt=\"Assinatura {}\">",
                escape_html(sig.as_data_url()),
                role_caption(role)
            )
        })
        .unwrap_or_default();
    format!(
        "<div class=\"signature\">{image}<div class=\"line\"><p class=\"name\">{}</p><p class=\"role\">{}</p></div></div>\n",
        escape_html(&party.contact.name),
        role_caption(role)
    )
}

fn witness_signature_html(witness: Option<&Witness>) -> String {
    let empty = Witness::default();
    let w = witness.unwrap_or(&empty);
    format!(
        "<div class=\"signature\"><div class=\"line\"><p class=\"name\">{}</p><p class=\"role\">CPF: {}</p></div></div>\n",
        escape_html(&w.name),
        escape_html(&w.doc)
    )
}

/// The printable contract: header, rendered body, closing formula, place and
/// date, signature blocks and footer, as one standalone HTML page.
pub fn render_final_document(record: &ContractRecord) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!(
        "<title>{}</title>\n",
        escape_html(export_filename(record).trim_end_matches(".pdf"))
    ));
    html.push_str("<style>\n");
    html.push_str(PAGE_CSS);
    html.push_str(BLOCK_CSS);
    html.push_str("</style>\n</head>\n<body>\n<div id=\"printable-contract\">\n");

    html.push_str(&format!(
        "<div class=\"doc-header\"><h1>{DOCUMENT_TITLE}</h1><p>{DOCUMENT_SUBTITLE}</p></div>\n"
    ));

    html.push_str("<div class=\"doc-body\">\n");
    html.push_str(&render_html(&record.generated_content));
    html.push_str("</div>\n");

    html.push_str("<div class=\"signatures\">\n");
    html.push_str(&format!("<p class=\"paragraph\">{CLOSING_FORMULA}</p>\n"));
    html.push_str(&format!(
        "<p class=\"place-date\">{}/{}, {}.</p>\n",
        escape_html(&record.provider.contact.city),
        escape_html(&record.provider.contact.state),
        escape_html(record.signature_date.as_deref().unwrap_or_default())
    ));

    html.push_str("<div class=\"signature-grid\">\n");
    html.push_str(&party_signature_html(record, PartyRole::Provider));
    html.push_str(&party_signature_html(record, PartyRole::Client));
    html.push_str("</div>\n");

    if record.include_witnesses {
        html.push_str("<div class=\"witnesses\"><p class=\"place-date\">Testemunhas</p>\n");
        html.push_str("<div class=\"signature-grid\">\n");
        html.push_str(&witness_signature_html(record.witness1.as_ref()));
        html.push_str(&witness_signature_html(record.witness2.as_ref()));
        html.push_str("</div></div>\n");
    }
    html.push_str("</div>\n");

    html.push_str(&format!(
        "<div class=\"doc-footer\"><span>{FOOTER_LEFT}</span><span>{FOOTER_RIGHT}</span></div>\n"
    ));
    html.push_str("</div>\n</body>\n</html>\n");
    html
}
