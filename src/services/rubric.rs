use crate::db::types::CorrectionType;

/// Closing instruction shared by every rubric. The score extractor anchors on
/// the "Nota Final:" label this sentence asks the model to emit; changing it
/// breaks `score_extraction`.
pub(crate) const FINAL_SCORE_INSTRUCTION: &str = "IMPORTANTE: Ao final da resposta, escreva a \
    nota total no formato: \"Nota Final: [valor numérico]\".";

/// Sent in place of the essay body when the submission is a scanned image;
/// the image itself travels as an inline part of the grading payload.
pub(crate) const IMAGE_SUBMISSION_NOTE: &str =
    "A redação foi enviada como imagem e está anexada a esta solicitação. Transcreva o que for \
     necessário e corrija o texto manuscrito da imagem.";

const ENEM_TEMPLATE: &str = "\
Você é uma IA corretora de redações dissertativo-argumentativas no padrão do ENEM. Avalie o \
texto com base nas cinco competências da Matriz de Referência do ENEM, atribuindo notas \
conforme os critérios oficiais, utilizando as faixas de 0-40-80-120-160-200 pontos para cada \
competência, totalizando até 1000 pontos.

Tema da redação: {tema}

Texto para correção:
{texto}

Análise detalhada por competência:
- Competência 1 (Domínio da norma culta): gramática, ortografia, pontuação e concordância.
- Competência 2 (Compreensão do tema): aderência ao tema proposto, sem tangentes ou fuga total.
- Competência 3 (Argumentação): organização de ideias, repertório sociocultural e coerência.
- Competência 4 (Coesão): uso de conectivos, progressão textual e estrutura lógica.
- Competência 5 (Proposta de intervenção): solução detalhada, que respeite os direitos humanos \
e esteja vinculada ao tema.

Liste 3 méritos da redação e 3 pontos a melhorar, atribua notas individuais por competência \
(0-200) e a nota total (0-1000), e ofereça recomendações específicas para elevar a nota em \
cada competência.

{marcador}";

const CONCURSOS_TEMPLATE: &str = "\
Analise a redação abaixo conforme os critérios oficiais da FCC, que avalia dissertações \
argumentativas em três eixos principais: Conteúdo (40 pontos), Estrutura (30 pontos) e \
Expressão (30 pontos). A nota total é de 100 pontos.

Tema da redação: {tema}

Texto para correção:
{texto}

Critérios de correção:
1. CONTEÚDO (40 pontos): perspectiva crítica, análise e senso crítico, consistência e \
coerência dos argumentos. Penalize abordagem tangencial, superficial ou cópia de textos da \
prova.
2. ESTRUTURA (30 pontos): gênero dissertativo-argumentativo, progressão textual \
(introdução, desenvolvimento, conclusão) e coesão entre frases e parágrafos.
3. EXPRESSÃO (30 pontos): domínio da norma culta, clareza, precisão vocabular e nível de \
linguagem compatível com o gênero.

Atribua notas parciais (0 a 40 para Conteúdo; 0 a 30 para Estrutura e Expressão), destaque 2 \
pontos fortes e 2 pontos fracos e apresente sugestões específicas de melhoria. A nota final é \
a soma das três partes (0 a 100).

{marcador}";

const FUVEST_TEMPLATE: &str = "\
Avalie a redação abaixo conforme os critérios oficiais da FUVEST, atribuindo nota de 10 a 50 \
pontos.

Tema da redação: {tema}

Texto para correção:
{texto}

Critérios de avaliação:
1. Desenvolvimento do tema e organização do texto dissertativo-argumentativo: compreensão da \
proposta, pertinência das informações, progressão temática e capacidade crítico-argumentativa \
(evite aceitar paráfrase da proposta ou textos meramente expositivos).
2. Coerência dos argumentos e articulação das partes do texto: organização das ideias, \
conclusões apropriadas, coesão textual e uso adequado de conectivos.
3. Correção gramatical e adequação vocabular: domínio da norma-padrão, ortografia, \
morfologia, sintaxe, pontuação e precisão do vocabulário.

Para cada critério atribua uma nota de 1 a 5, multiplique as notas por 4, 3 e 3, \
respectivamente, e some as notas ponderadas para obter a nota final (mínimo 10, máximo 50). \
Liste 2 pontos positivos, 2 aspectos a aprimorar e recomendações específicas por critério.

{marcador}";

const GENERIC_TEMPLATE: &str = "\
Corrija o texto abaixo considerando critérios gerais de redação: adequação ao tema, \
estrutura, coesão, coerência e domínio da norma culta. Atribua uma nota de 0 a 100 e faça \
comentários detalhados sobre os pontos positivos e negativos.

Tema da redação: {tema}

Texto do aluno:
{texto}

{marcador}";

fn template_for(correction_type: CorrectionType) -> &'static str {
    match correction_type {
        CorrectionType::Enem => ENEM_TEMPLATE,
        CorrectionType::Concursos => CONCURSOS_TEMPLATE,
        CorrectionType::Fuvest => FUVEST_TEMPLATE,
        CorrectionType::Generic => GENERIC_TEMPLATE,
    }
}

/// Plain string substitution of theme and essay text into the rubric for the
/// given correction type. Never fails; every rubric closes with
/// [`FINAL_SCORE_INSTRUCTION`].
pub(crate) fn build_prompt(correction_type: CorrectionType, theme: &str, text: &str) -> String {
    template_for(correction_type)
        .replace("{tema}", theme)
        .replace("{texto}", text)
        .replace("{marcador}", FINAL_SCORE_INSTRUCTION)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_TYPES: [CorrectionType; 4] = [
        CorrectionType::Enem,
        CorrectionType::Concursos,
        CorrectionType::Fuvest,
        CorrectionType::Generic,
    ];

    #[test]
    fn every_rubric_ends_with_the_extraction_marker() {
        for correction_type in ALL_TYPES {
            let prompt = build_prompt(correction_type, "Tema de teste", "Texto de teste.");
            assert!(
                prompt.ends_with(FINAL_SCORE_INSTRUCTION),
                "{correction_type:?} rubric must close with the Nota Final instruction"
            );
            assert!(prompt.contains("Nota Final:"));
        }
    }

    #[test]
    fn prompt_interpolates_theme_and_text() {
        let prompt = build_prompt(
            CorrectionType::Enem,
            "Desafios da educação digital",
            "A tecnologia transformou a sala de aula.",
        );
        assert!(prompt.contains("Desafios da educação digital"));
        assert!(prompt.contains("A tecnologia transformou a sala de aula."));
        assert!(!prompt.contains("{tema}"));
        assert!(!prompt.contains("{texto}"));
        assert!(!prompt.contains("{marcador}"));
    }

    #[test]
    fn rubric_selection_is_per_type() {
        let enem = build_prompt(CorrectionType::Enem, "t", "x");
        let concursos = build_prompt(CorrectionType::Concursos, "t", "x");
        let fuvest = build_prompt(CorrectionType::Fuvest, "t", "x");
        let generic = build_prompt(CorrectionType::Generic, "t", "x");

        assert!(enem.contains("1000 pontos"));
        assert!(concursos.contains("FCC"));
        assert!(fuvest.contains("FUVEST"));
        assert!(generic.contains("critérios gerais"));
    }
}
